use axum::Json;

use crate::api::rest::extract::ClientIp;
use crate::api::rest::types::IpResponse;

pub async fn ip_text(ClientIp(ip): ClientIp) -> String {
    ip.unwrap_or_default()
}

pub async fn ip_json(ClientIp(ip): ClientIp) -> Json<IpResponse> {
    Json(IpResponse { ip })
}

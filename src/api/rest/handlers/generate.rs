use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use rand::rngs::ThreadRng;

use crate::api::error::ApiError;
use crate::api::rest::extract::ApiQuery;
use crate::api::rest::types::{
    AmountParams, BytesParams, ColorParams, DateParams, NumberParams, StringParams,
    TimestampParam, UuidV5Params, UuidV7Params,
};
use crate::api::state::AppState;
use crate::generate::{self, GenerateConfig, GenerateError, DEFAULT_BULK_AMOUNT};

/// Runs `f` `amount` times on the blocking pool.
async fn bulk<T, F>(amount: usize, mut f: F) -> Result<Json<Vec<T>>, ApiError>
where
    T: Send + 'static,
    F: FnMut(&mut ThreadRng) -> T + Send + 'static,
{
    let values = tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        (0..amount).map(|_| f(&mut rng)).collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        tracing::error!("Generator task failed: {}", e);
        ApiError::InternalServerError
    })?;
    Ok(Json(values))
}

fn amount(config: &GenerateConfig, requested: Option<usize>) -> Result<usize, ApiError> {
    Ok(config.check_amount(requested.unwrap_or(DEFAULT_BULK_AMOUNT))?)
}

fn check_bytes(requested: usize, max: usize) -> Result<(), GenerateError> {
    if requested > max {
        return Err(GenerateError::TooManyBytes { requested, max });
    }
    Ok(())
}

/// `amount * length` must fit the total budget.
fn check_total(amount: usize, length: usize, max: usize) -> Result<(), GenerateError> {
    let requested = amount.checked_mul(length).unwrap_or(usize::MAX);
    check_bytes(requested, max)
}

fn timestamp(param: Option<TimestampParam>) -> Result<Option<DateTime<Utc>>, GenerateError> {
    match param {
        None => Ok(None),
        Some(TimestampParam::Millis(ms)) => generate::parse_timestamp(&ms.to_string()).map(Some),
        Some(TimestampParam::Text(raw)) => generate::parse_timestamp(&raw).map(Some),
    }
}

fn date_range(params: &DateParams) -> Result<(DateTime<Utc>, DateTime<Utc>), GenerateError> {
    let start = generate::parse_date(
        params
            .start
            .as_deref()
            .unwrap_or(generate::DEFAULT_START_DATE),
    )?;
    let end = match params.end.as_deref() {
        Some(raw) => generate::parse_date(raw)?,
        None => Utc::now(),
    };
    Ok((start, end))
}

fn uuid_v7(params: UuidV7Params) -> Result<String, ApiError> {
    let ts = timestamp(params.timestamp)?;
    Ok(generate::uuid_v7(params.encoding.unwrap_or_default(), ts))
}

pub async fn uuid_v7_query(ApiQuery(params): ApiQuery<UuidV7Params>) -> Result<String, ApiError> {
    uuid_v7(params)
}

pub async fn uuid_v7_json(params: Option<Json<UuidV7Params>>) -> Result<String, ApiError> {
    uuid_v7(params.map(|Json(p)| p).unwrap_or_default())
}

pub async fn uuid_v7_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UuidV7Params>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let encoding = params.encoding.unwrap_or_default();
    let ts = timestamp(params.timestamp)?;
    bulk(amount, move |_| generate::uuid_v7(encoding, ts)).await
}

pub async fn uuid_v4() -> String {
    generate::uuid_v4()
}

pub async fn uuid_v4_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AmountParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    bulk(amount, |_| generate::uuid_v4()).await
}

pub async fn uuid_v5(ApiQuery(params): ApiQuery<UuidV5Params>) -> Result<String, ApiError> {
    Ok(generate::uuid_v5(&params.namespace, &params.name)?)
}

pub async fn number(ApiQuery(params): ApiQuery<NumberParams>) -> Result<Json<i64>, ApiError> {
    let min = params.min.unwrap_or(generate::DEFAULT_MIN);
    let max = params.max.unwrap_or(generate::DEFAULT_MAX);
    Ok(Json(generate::number(&mut rand::thread_rng(), min, max)?))
}

pub async fn number_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<NumberParams>,
) -> Result<Json<Vec<i64>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let min = params.min.unwrap_or(generate::DEFAULT_MIN);
    let max = params.max.unwrap_or(generate::DEFAULT_MAX);
    if min > max {
        return Err(GenerateError::InvalidRange { min, max }.into());
    }
    bulk(amount, move |rng| generate::number(rng, min, max).unwrap_or(min)).await
}

pub async fn string(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StringParams>,
) -> Result<String, ApiError> {
    let length = params.length.unwrap_or(generate::DEFAULT_STRING_LENGTH);
    check_bytes(length, state.generate.max_total_bytes)?;
    let charset = params.charset.unwrap_or_default();
    Ok(generate::string(&mut rand::thread_rng(), length, charset))
}

pub async fn string_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StringParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let length = params.length.unwrap_or(generate::DEFAULT_STRING_LENGTH);
    check_total(amount, length, state.generate.max_total_bytes)?;
    let charset = params.charset.unwrap_or_default();
    bulk(amount, move |rng| generate::string(rng, length, charset)).await
}

pub async fn boolean() -> Json<bool> {
    Json(generate::boolean(&mut rand::thread_rng()))
}

pub async fn boolean_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AmountParams>,
) -> Result<Json<Vec<bool>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    bulk(amount, |rng| generate::boolean(rng)).await
}

pub async fn date(ApiQuery(params): ApiQuery<DateParams>) -> Result<String, ApiError> {
    let (start, end) = date_range(&params)?;
    Ok(generate::date(&mut rand::thread_rng(), start, end)?)
}

pub async fn date_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DateParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let (start, end) = date_range(&params)?;
    let values = bulk(amount, move |rng| generate::date(rng, start, end)).await?;
    let dates = values.0.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(Json(dates))
}

pub async fn color(ApiQuery(params): ApiQuery<ColorParams>) -> String {
    generate::color(&mut rand::thread_rng(), params.format.unwrap_or_default())
}

pub async fn color_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ColorParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let format = params.format.unwrap_or_default();
    bulk(amount, move |rng| generate::color(rng, format)).await
}

pub async fn bytes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BytesParams>,
) -> Result<String, ApiError> {
    let length = params.length.unwrap_or(generate::DEFAULT_BYTES_LENGTH);
    check_bytes(length, state.generate.max_total_bytes)?;
    let out = tokio::task::spawn_blocking(move || {
        generate::bytes_hex(&mut rand::thread_rng(), length)
    })
    .await
    .map_err(|e| {
        tracing::error!("Generator task failed: {}", e);
        ApiError::InternalServerError
    })?;
    Ok(out)
}

pub async fn bytes_bulk(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BytesParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let amount = amount(&state.generate, params.amount)?;
    let length = params.length.unwrap_or(generate::DEFAULT_BYTES_LENGTH);
    check_bytes(length, state.generate.max_bulk_item_bytes)?;
    check_total(amount, length, state.generate.max_total_bytes)?;
    bulk(amount, move |rng| generate::bytes_hex(rng, length)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_overflow_is_rejected() {
        assert!(check_total(usize::MAX, 2, 10).is_err());
        assert!(check_total(5, 2, 10).is_ok());
        assert!(check_total(6, 2, 10).is_err());
    }

    #[test]
    fn test_timestamp_param_forms() {
        let millis = timestamp(Some(TimestampParam::Millis(1_000))).unwrap().unwrap();
        assert_eq!(millis.timestamp_millis(), 1_000);
        let text = timestamp(Some(TimestampParam::Text("1000".into()))).unwrap().unwrap();
        assert_eq!(text, millis);
        assert!(timestamp(Some(TimestampParam::Text("later".into()))).is_err());
        assert!(timestamp(None).unwrap().is_none());
    }
}

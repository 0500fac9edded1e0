pub mod error;
pub mod rest;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

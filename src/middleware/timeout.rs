use tower::timeout::error::Elapsed;
use tower::BoxError;

use crate::error::ApiError;

/// Turns errors from the timeout layer into responses
pub async fn handle_timeout_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded the configured timeout");
        ApiError::RequestTimeout
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        ApiError::StoreFailure
    }
}

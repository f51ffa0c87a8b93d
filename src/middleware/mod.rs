pub mod extract;
pub mod response;
pub mod timeout;

pub use extract::{JsonBody, PathParams, QueryParams};
pub use response::{ApiResponse, ApiResult};
pub use timeout::handle_timeout_error;

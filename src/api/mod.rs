pub mod grants;
pub mod response;

pub use grants::grants_from_headers;
pub use response::{ApiResponse, ApiResult};

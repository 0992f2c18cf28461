pub mod request;
pub mod response;

pub use request::{REQUEST_BUDGET, request_path, seconds_param, value_param};
pub use response::Response;

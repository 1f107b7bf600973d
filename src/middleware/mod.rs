//! HTTP middleware applied to every route

mod cors;
mod panic;
mod request_id;

pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, cors_middleware};
pub use panic::panic_response;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

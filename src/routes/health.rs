use poem::{handler, http::StatusCode};

#[handler]
pub fn health_check() -> StatusCode {
    StatusCode::OK
}

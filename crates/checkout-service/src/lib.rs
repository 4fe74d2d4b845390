//! HTTP front for the pre-order checkout.

pub mod api;
pub mod state;

pub use api::{router, start_http_server, SessionId, SESSION_HEADER};
pub use state::AppState;

//! The HTTP layer: routing, request/response shapes, error mapping, and
//! server bootstrap.

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod logging;
pub mod routes;

pub use bootstrap::{build_context, run_server, ServerConfig};
pub use error::ApiError;
pub use routes::{CardRoomServer, ServerContext};

pub mod handlers;
pub mod middleware;
pub mod recompute;
pub mod routes;
pub mod stats;
pub mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};

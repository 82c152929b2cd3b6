pub mod autopilot;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod videos;

pub use routes::create_router;

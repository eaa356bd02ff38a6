// Application layer: HTTP routes and server bootstrap.

pub mod routes;
pub mod server;

pub use routes::build_router;
pub use server::{serve, AppState};

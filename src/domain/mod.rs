// Domain layer: request/response records and the port the HTTP layer depends on.

pub mod model;
pub mod ports;

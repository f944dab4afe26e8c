pub mod config;
mod generation_routes;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;
mod theory_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::run_server;
pub use state::{Generators, ServerState};

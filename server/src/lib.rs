//! HTTP surface and command line for the claimflow workflow engine.

mod cli;
pub mod error;
pub mod routes;
mod server;
pub mod state;
pub mod telemetry;

pub use cli::run;
pub use error::ServerError;
pub use routes::router;
pub use state::AppState;

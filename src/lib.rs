pub mod config;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod server;
pub mod translate;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use logging::SharedLogger;
pub use models::{map_model, ModelMapper};
pub use server::{build_router, AppState};

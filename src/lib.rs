pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod screens;
pub mod services;
pub mod templates;
pub mod update;
pub mod utils;

pub use error::PanelError;
pub use models::AppState;
pub use routes::build_router;

pub mod app;
pub mod calendar;
pub mod config;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tracked;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Clock};
pub use storage::FileStore;

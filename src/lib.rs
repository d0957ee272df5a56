pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use monitor::*;
pub use scrapers::*;
pub use utils::*;

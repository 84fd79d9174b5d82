pub mod config;
pub mod db;
pub mod error;

pub use config::{AppConfig, MailConfig};
pub use error::PlannerError;

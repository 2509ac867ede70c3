pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod runner;
pub mod shells;

pub use config::KioskConfig;
pub use error::KioskError;
pub use runner::{Kiosk, run};

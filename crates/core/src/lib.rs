pub mod cards;
pub mod config;
pub mod error;

pub use cards::*;
pub use config::Config;
pub use error::*;

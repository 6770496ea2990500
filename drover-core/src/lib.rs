mod config;
mod constants;
mod error;
mod results;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use results::*;

mod config;
mod constants;
mod histogram;
mod report;

pub use config::*;
pub use constants::*;
pub use histogram::*;
pub use report::*;

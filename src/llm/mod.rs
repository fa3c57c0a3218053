pub mod advisor;
pub mod client;
pub mod types;
pub mod utils;

pub use advisor::*;
pub use client::*;
pub use types::*;

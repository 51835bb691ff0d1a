pub mod config;
pub mod genome;
pub mod protocol;

pub use config::*;
pub use genome::*;
pub use protocol::*;

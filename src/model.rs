mod config;
mod manifest;
mod state;

pub use self::config::*;
pub use self::manifest::*;
pub use self::state::*;

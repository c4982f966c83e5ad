pub mod error;
pub mod launch;
pub mod logging;
pub mod model;
pub mod path_ops;
pub mod remote;
pub mod resolver;
pub mod shell;
pub mod store;
pub mod sync;

//! Database access: schema, settings and catalog snapshot loading

pub mod catalog;
pub mod init;
pub mod settings;

pub use catalog::*;
pub use init::*;
pub use settings::*;

//! CLI command implementations.

pub mod build;
pub mod sync;

pub use build::build_site;
pub use sync::sync_vault;

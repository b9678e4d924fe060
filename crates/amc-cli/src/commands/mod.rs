//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`compose`] - Merge tenants into the base configuration
//! - [`validate`] - Check tenant configurations
//! - [`relabel`] - Check relabel rules against a Prometheus version

pub mod compose;
pub mod relabel;
pub mod validate;

pub use compose::ComposeCommand;
pub use relabel::RelabelCommand;
pub use validate::ValidateCommand;

//! Prometheus relabel rule validation.
//!
//! `amc-relabel` checks relabel rules the way a given Prometheus version
//! would when loading its configuration, so invalid rules are caught before
//! they reach a running server.
//!
//! # Example
//!
//! ```rust
//! use amc_relabel::{RelabelConfig, RelabelValidator};
//!
//! let validator = RelabelValidator::from_version_str("v2.30.0").unwrap();
//! let rule = RelabelConfig::new("uppercase").target_label("pod");
//!
//! assert!(validator.validate(&[rule.clone()]).is_err());
//! assert!(RelabelValidator::from_version_str("2.36").unwrap().validate(&[rule]).is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod validator;

// Re-export main types at crate root
pub use config::{
    Action, DEFAULT_MODULUS, DEFAULT_REGEX, DEFAULT_REPLACEMENT, DEFAULT_SEPARATOR, RelabelConfig,
};
pub use error::{RelabelError, Result};
pub use validator::{CASE_ACTIONS_SINCE, EQUAL_ACTIONS_SINCE, RelabelValidator, UTF8_NAMES_SINCE};

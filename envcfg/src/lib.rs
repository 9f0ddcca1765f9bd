//! Typed configuration from environment variables
//!
//! `envcfg` loads environment variables (or any `String` to `String` map) into
//! the fields of your own structs. Each field names the variable(s) it reads and
//! an optional default. The field's type decides which converter runs.
//!
//! Converters live in a [`Registry`]. The built-in set covers the standard
//! scalar types, durations, timestamps, URLs and IP addresses. You can register
//! your own for any other type. A populate call visits every field and reports
//! all missing or malformed values in one error, so a misconfigured deployment
//! can be fixed in one pass.
//!
//! # Features
//!
//! - **Declarative**: tag fields with `#[derive(EnvCfg)]` and `#[env(...)]`
//! - **Extensible**: register a converter for any type with [`Registry::register`]
//! - **Multi-key fields**: one converter can combine several variables
//! - **Default values**: fall back to a string default when a variable is unset
//! - **Complete errors**: every failing field is reported, not just the first
//! - **Panic-safe**: a panicking converter becomes an ordinary field error
//!
//! # Example
//!
//! ```rust
//! use envcfg::{EnvCfg, Load};
//! use std::time::Duration;
//!
//! #[derive(Debug, Default, EnvCfg)]
//! struct Config {
//!     #[env(name = "DATABASE_URL")]
//!     pub database_url: String,
//!
//!     #[env(name = "REFRESH_INTERVAL", default = "30s")]
//!     pub refresh_interval: Duration,
//!
//!     #[env(name = "MAX_CONNECTIONS", default = "10")]
//!     pub max_connections: u32,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("DATABASE_URL", "postgres://localhost/db");
//! let config = Config::from_env()?;
//! assert_eq!(config.database_url, "postgres://localhost/db");
//! assert_eq!(config.refresh_interval, Duration::from_secs(30));
//! #     Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! ## `#[env(name = "KEY")]`
//!
//! Read the field from `KEY`. Several keys can be listed, separated by commas.
//! The converter registered for the field's type must then accept that many
//! string arguments.
//!
//! ```rust
//! # use envcfg::{EnvCfg, Registry, Source};
//! #[derive(Default, EnvCfg)]
//! struct Config {
//!     #[env(name = "DB_HOST,DB_PORT")]
//!     pub database: (String, u16),
//! }
//!
//! fn parse_database(host: &str, port: &str) -> Result<(String, u16), String> {
//!     let port = port.parse().map_err(|e| format!("bad port: {e}"))?;
//!     Ok((host.to_string(), port))
//! }
//!
//! # fn main() -> Result<(), envcfg::Error> {
//! let mut registry = Registry::new();
//! registry.register(parse_database)?;
//!
//! let source = Source::from([
//!     ("DB_HOST".to_string(), "db".to_string()),
//!     ("DB_PORT".to_string(), "5432".to_string()),
//! ]);
//! let mut config = Config::default();
//! registry.populate_from_map(&source, &mut config)?;
//! assert_eq!(config.database, ("db".to_string(), 5432));
//! # Ok(())
//! # }
//! ```
//!
//! A bare `#[env]` reads the field name in upper case.
//!
//! ## `#[env(name = "KEY", default = "value")]`
//!
//! Use `value` when `KEY` is unset. The default is a string and goes through the
//! same converter as a real value. With several keys, list one default per key.
//!
//! ## `#[env(prefix = "APP_")]` on the struct
//!
//! Prepend a prefix to every key of the struct.
//!
//! # Errors
//!
//! Data problems (a missing value with no default, a type with no converter, a
//! converter that fails or panics) are collected into [`Error::Fields`]. Tag
//! problems (a default count that does not match the key count, a key count
//! that does not match the converter) stop the call immediately.

#[doc(hidden)]
extern crate self as envcfg;

pub mod env;
pub mod parsers;
pub mod populate;
pub mod registry;

mod error;
mod global;

pub use envcfg_derive::EnvCfg;
pub use error::{AggregateError, ConvertError, Error, FieldError};
pub use global::{populate_from_env, populate_from_map, register, register_json, register_raw};
pub use populate::{FieldSpec, Fields, Load, Record, Source};
pub use registry::{ConversionEntry, Converter, Registry};

// Re-export anyhow for the `Load` trait
#[doc(hidden)]
pub use anyhow;

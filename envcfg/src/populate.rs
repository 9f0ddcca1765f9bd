//! Populating records from a key/value source
//!
//! [`Registry::populate_from_map`] walks a record's tagged fields in declaration
//! order. For each field it resolves the source strings (or defaults), runs the
//! converter registered for the field's type, and assigns the result. Data
//! problems are collected and reported together; tag mistakes stop the call.

use crate::error::{AggregateError, ConvertError, Error, FieldError};
use crate::registry::Registry;
use std::any::{self, Any};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Key/value table that records are populated from.
pub type Source = HashMap<String, String>;

/// Separator between keys in `name` tags and between values in `default` tags.
pub const DELIMITER: char = ',';

/// Tag information for one record field.
///
/// Built by `#[derive(EnvCfg)]`; hand-written [`Record`] impls construct it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identifier, used in error messages
    pub name: &'static str,
    /// Source keys separated by [`DELIMITER`]
    pub keys: &'static str,
    /// Default values separated by [`DELIMITER`], positionally matching `keys`.
    /// Whitespace around each value is trimmed, as it is for keys.
    pub defaults: Option<&'static str>,
}

/// A struct whose fields can be populated by a [`Registry`].
///
/// Usually derived:
///
/// ```rust
/// use envcfg::{EnvCfg, Registry, Source};
///
/// #[derive(Debug, Default, EnvCfg)]
/// struct Config {
///     #[env(name = "S")]
///     s: String,
///     #[env(name = "N", default = "7")]
///     n: i64,
///     // No #[env] attribute: left alone
///     untouched: u8,
/// }
///
/// # fn main() -> Result<(), envcfg::Error> {
/// let source = Source::from([("S".to_string(), "hi".to_string())]);
/// let mut config = Config::default();
/// Registry::new().populate_from_map(&source, &mut config)?;
/// assert_eq!(config.s, "hi");
/// assert_eq!(config.n, 7);
/// assert_eq!(config.untouched, 0);
/// # Ok(())
/// # }
/// ```
pub trait Record {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// Call [`Fields::field`] for every tagged field, in declaration order,
    /// propagating its error with `?`.
    fn populate_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), Error>;
}

/// Per-call state handed to [`Record::populate_fields`].
pub struct Fields<'a> {
    registry: &'a Registry,
    source: &'a Source,
    record: &'static str,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn new(registry: &'a Registry, source: &'a Source, record: &'static str) -> Self {
        Self {
            registry,
            source,
            record,
            errors: Vec::new(),
        }
    }

    /// Resolve, convert and assign a single field.
    ///
    /// Returns `Err` only for tag mistakes: a default count that differs from
    /// the key count, or a key count that differs from the converter's arity.
    /// Missing values and converter failures are recorded and reported when
    /// the whole record has been visited.
    pub fn field<T: Any>(&mut self, spec: FieldSpec, slot: &mut T) -> Result<(), Error> {
        let record = self.record;
        let keys = split_tag(spec.keys);
        let defaults = spec.defaults.map(split_tag);

        if let Some(defaults) = &defaults {
            if defaults.len() != keys.len() {
                return Err(Error::DefaultCountMismatch {
                    record,
                    field: spec.name,
                    keys: keys.len(),
                    defaults: defaults.len(),
                });
            }
        }

        let registry = self.registry;
        let Some(entry) = registry.get::<T>() else {
            self.errors.push(FieldError::NoConverter {
                type_name: any::type_name::<T>(),
                record,
                field: spec.name,
            });
            return Ok(());
        };

        if entry.arity() != keys.len() {
            return Err(Error::ArityMismatch {
                record,
                field: spec.name,
                type_name: entry.type_name(),
                converter: entry.converter(),
                keys: keys.len(),
                arity: entry.arity(),
            });
        }

        let source = self.source;
        let mut args = Vec::with_capacity(keys.len());
        let mut resolved = true;
        for (i, key) in keys.iter().enumerate() {
            if let Some(value) = source.get(*key) {
                args.push(value.as_str());
                continue;
            }
            match defaults.as_ref().map(|d| d[i]) {
                Some(default) => {
                    debug!(record, field = spec.name, key = *key, "using default value");
                    args.push(default);
                }
                None => {
                    self.errors.push(FieldError::Missing {
                        key: (*key).to_string(),
                        record,
                        field: spec.name,
                    });
                    resolved = false;
                }
            }
        }
        if !resolved {
            return Ok(());
        }

        match entry.invoke(&args) {
            Ok(value) => match value.downcast::<T>() {
                Ok(value) => {
                    *slot = *value;
                    trace!(record, field = spec.name, "populated field");
                }
                Err(_) => self.errors.push(FieldError::Conversion {
                    field: spec.name,
                    source: ConvertError::Failed(format!(
                        "converter for {} produced a value of another type",
                        entry.type_name()
                    )),
                }),
            },
            Err(error) => self.errors.push(FieldError::Conversion {
                field: spec.name,
                source: error,
            }),
        }
        Ok(())
    }

    fn finish(self) -> Result<(), Error> {
        debug!(
            record = self.record,
            errors = self.errors.len(),
            "finished populating record"
        );
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AggregateError::new(self.errors).into())
        }
    }
}

// Whitespace around the delimiter is ignored in both keys and defaults
fn split_tag(tag: &str) -> Vec<&str> {
    tag.split(DELIMITER).map(str::trim).collect()
}

impl Registry {
    /// Populate `record` from `source`.
    ///
    /// Every tagged field is visited even after a field fails, so the returned
    /// [`Error::Fields`] lists every missing value and conversion failure at
    /// once. Fields without a tag are left as they were.
    pub fn populate_from_map<R: Record>(&self, source: &Source, record: &mut R) -> Result<(), Error> {
        let mut fields = Fields::new(self, source, R::NAME);
        record.populate_fields(&mut fields)?;
        fields.finish()
    }

    /// Populate `record` from the process environment.
    pub fn populate_from_env<R: Record>(&self, record: &mut R) -> Result<(), Error> {
        let source = crate::env::environment();
        self.populate_from_map(&source, record)
    }
}

/// Build records from the process-wide registry.
///
/// Implemented for every [`Record`] that also implements `Default`. Fields are
/// populated onto `Self::default()`.
pub trait Load: Record + Default {
    /// Load from the process environment.
    fn from_env() -> anyhow::Result<Self> {
        let mut record = Self::default();
        crate::global::populate_from_env(&mut record)?;
        Ok(record)
    }

    /// Load from an explicit key/value source.
    fn from_map(source: &Source) -> anyhow::Result<Self> {
        let mut record = Self::default();
        crate::global::populate_from_map(source, &mut record)?;
        Ok(record)
    }
}

impl<R: Record + Default> Load for R {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Baz;

    #[derive(Debug, Default)]
    struct Manual {
        host: String,
        port: u16,
        endpoint: (String, u16),
        untagged: i32,
    }

    impl Record for Manual {
        const NAME: &'static str = "Manual";

        fn populate_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), Error> {
            fields.field(
                FieldSpec {
                    name: "host",
                    keys: "HOST",
                    defaults: Some("localhost"),
                },
                &mut self.host,
            )?;
            fields.field(
                FieldSpec {
                    name: "port",
                    keys: "PORT",
                    defaults: None,
                },
                &mut self.port,
            )?;
            fields.field(
                FieldSpec {
                    name: "endpoint",
                    keys: "EP_HOST, EP_PORT",
                    defaults: Some("example.com, 443"),
                },
                &mut self.endpoint,
            )?;
            Ok(())
        }
    }

    fn source(pairs: &[(&str, &str)]) -> Source {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(|host: &str, port: &str| -> Result<(String, u16), String> {
                let port = port.parse::<u16>().map_err(|e| e.to_string())?;
                Ok((host.to_string(), port))
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_manual_record_round_trip() {
        let mut record = Manual::default();
        registry()
            .populate_from_map(
                &source(&[("HOST", "db"), ("PORT", "5432"), ("EP_PORT", "8443")]),
                &mut record,
            )
            .unwrap();

        assert_eq!(record.host, "db");
        assert_eq!(record.port, 5432);
        // EP_HOST falls back to its default, EP_PORT comes from the source
        assert_eq!(record.endpoint, ("example.com".to_string(), 8443));
        assert_eq!(record.untagged, 0);
    }

    #[test]
    fn test_missing_value_is_aggregated() {
        let mut record = Manual::default();
        let err = registry()
            .populate_from_map(&source(&[]), &mut record)
            .unwrap_err();

        let Error::Fields(errors) = err else {
            panic!("Expected Fields error, got {err:?}");
        };
        assert_eq!(
            errors.errors(),
            &[FieldError::Missing {
                key: "PORT".to_string(),
                record: "Manual",
                field: "port",
            }]
        );
        // Fields after the failing one are still populated
        assert_eq!(record.endpoint, ("example.com".to_string(), 443));
    }

    #[test]
    fn test_conversion_failure_is_field_scoped() {
        let mut record = Manual::default();
        let err = registry()
            .populate_from_map(&source(&[("PORT", "http")]), &mut record)
            .unwrap_err();

        let Error::Fields(errors) = err else {
            panic!("Expected Fields error");
        };
        assert_eq!(errors.len(), 1);
        match &errors.errors()[0] {
            FieldError::Conversion {
                field,
                source: ConvertError::Failed(message),
            } => {
                assert_eq!(*field, "port");
                assert!(message.contains("invalid digit"));
            }
            other => panic!("Expected Conversion error, got {other:?}"),
        }
        assert_eq!(record.port, 0);
    }

    struct MultiMissing {
        pair: (String, u16),
        baz: Baz,
    }

    impl Record for MultiMissing {
        const NAME: &'static str = "MultiMissing";

        fn populate_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), Error> {
            fields.field(
                FieldSpec {
                    name: "pair",
                    keys: "A,B",
                    defaults: None,
                },
                &mut self.pair,
            )?;
            fields.field(
                FieldSpec {
                    name: "baz",
                    keys: "BAZ",
                    defaults: Some("x"),
                },
                &mut self.baz,
            )
        }
    }

    #[test]
    fn test_all_missing_keys_and_fields_reported() {
        let mut record = MultiMissing {
            pair: Default::default(),
            baz: Baz,
        };
        let err = registry()
            .populate_from_map(&source(&[]), &mut record)
            .unwrap_err();

        let Error::Fields(errors) = err else {
            panic!("Expected Fields error");
        };
        let fields: Vec<_> = errors.iter().map(FieldError::field).collect();
        assert_eq!(fields, ["pair", "pair", "baz"]);
        assert!(matches!(&errors.errors()[0], FieldError::Missing { key, .. } if key == "A"));
        assert!(matches!(&errors.errors()[1], FieldError::Missing { key, .. } if key == "B"));
        assert!(matches!(
            &errors.errors()[2],
            FieldError::NoConverter { field: "baz", .. }
        ));
    }

    struct BadDefaults {
        first: String,
        second: String,
    }

    impl Record for BadDefaults {
        const NAME: &'static str = "BadDefaults";

        fn populate_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), Error> {
            fields.field(
                FieldSpec {
                    name: "first",
                    keys: "FIRST",
                    defaults: None,
                },
                &mut self.first,
            )?;
            fields.field(
                FieldSpec {
                    name: "second",
                    keys: "SECOND",
                    defaults: Some("a,b"),
                },
                &mut self.second,
            )
        }
    }

    #[test]
    fn test_default_count_mismatch_fails_fast() {
        let mut record = BadDefaults {
            first: String::new(),
            second: String::new(),
        };
        let err = Registry::new()
            .populate_from_map(&source(&[("SECOND", "set")]), &mut record)
            .unwrap_err();

        // The missing FIRST value is not reported; the tag mistake wins
        assert_eq!(
            err,
            Error::DefaultCountMismatch {
                record: "BadDefaults",
                field: "second",
                keys: 1,
                defaults: 2,
            }
        );
        assert_eq!(record.second, "");
    }

    struct BadArity {
        value: String,
    }

    impl Record for BadArity {
        const NAME: &'static str = "BadArity";

        fn populate_fields(&mut self, fields: &mut Fields<'_>) -> Result<(), Error> {
            fields.field(
                FieldSpec {
                    name: "value",
                    keys: "A,B",
                    defaults: None,
                },
                &mut self.value,
            )
        }
    }

    #[test]
    fn test_arity_mismatch_fails_fast() {
        let mut record = BadArity {
            value: String::new(),
        };
        let err = Registry::new()
            .populate_from_map(&source(&[("A", "1"), ("B", "2")]), &mut record)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ArityMismatch {
                record: "BadArity",
                field: "value",
                keys: 2,
                arity: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_split_tag_trims_whitespace() {
        assert_eq!(split_tag("A, B ,C"), ["A", "B", "C"]);
        assert_eq!(split_tag("ONLY"), ["ONLY"]);
    }
}

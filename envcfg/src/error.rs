//! Error types for converter registration and record population

use std::fmt;

/// Errors returned by [`Registry`](crate::Registry) registration and population calls.
///
/// The variants fall into two groups:
/// - Authoring mistakes (bad registrations, tags that disagree with a converter)
///   are returned as soon as they are found.
/// - Problems with the configuration data itself are collected across every
///   field and returned together as [`Error::Fields`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A converter for the produced type is already registered.
    ///
    /// The first registration wins; the rejected converter is dropped.
    #[error(
        "a converter has already been registered for the {type_name} type. cannot also register {converter}"
    )]
    DuplicateConverter {
        /// Name of the produced type
        type_name: &'static str,
        /// Name of the converter that was rejected
        converter: &'static str,
    },

    /// A raw converter was registered with an arity of zero.
    #[error("converter should accept at least 1 string argument. {converter} accepts 0 arguments")]
    ZeroArity {
        /// Name of the rejected converter
        converter: &'static str,
    },

    /// A field declares a different number of defaults than source keys.
    #[error("{record}.{field} declares {keys} key(s) but {defaults} default(s)")]
    DefaultCountMismatch {
        /// Name of the record type
        record: &'static str,
        /// Name of the offending field
        field: &'static str,
        /// Number of source keys in the tag
        keys: usize,
        /// Number of default values in the tag
        defaults: usize,
    },

    /// A field lists a different number of source keys than its converter accepts.
    #[error(
        "{record}.{field} lists {keys} key(s) but the converter for {type_name} ({converter}) accepts {arity} argument(s)"
    )]
    ArityMismatch {
        /// Name of the record type
        record: &'static str,
        /// Name of the offending field
        field: &'static str,
        /// Name of the field type
        type_name: &'static str,
        /// Name of the registered converter
        converter: &'static str,
        /// Number of source keys in the tag
        keys: usize,
        /// Number of arguments the converter accepts
        arity: usize,
    },

    /// One or more fields could not be populated.
    #[error(transparent)]
    Fields(#[from] AggregateError),
}

/// A problem with the configuration data for a single field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A source key is absent and the field has no default.
    #[error("no {key} value found, and {record}.{field} has no default")]
    Missing {
        /// The source key that was looked up
        key: String,
        /// Name of the record type
        record: &'static str,
        /// Name of the field
        field: &'static str,
    },

    /// No converter is registered for the field's type.
    #[error("no converter function found for type {type_name} (field {record}.{field})")]
    NoConverter {
        /// Name of the field type
        type_name: &'static str,
        /// Name of the record type
        record: &'static str,
        /// Name of the field
        field: &'static str,
    },

    /// The converter returned an error or panicked.
    #[error("cannot populate {field}: {source}")]
    Conversion {
        /// Name of the field
        field: &'static str,
        /// What went wrong inside the converter
        source: ConvertError,
    },
}

impl FieldError {
    /// Name of the field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field, .. }
            | Self::NoConverter { field, .. }
            | Self::Conversion { field, .. } => field,
        }
    }
}

/// Failure reported by a registered converter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// The converter returned an error; holds its message.
    #[error("{0}")]
    Failed(String),

    /// The converter panicked while running.
    #[error("{converter} panicked: {message}")]
    Panicked {
        /// Name of the converter that panicked
        converter: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },

    /// The converter was called with the wrong number of arguments.
    #[error("{converter} expects {expected} argument(s), got {got}")]
    Arity {
        /// Name of the converter
        converter: &'static str,
        /// Arity the converter was registered with
        expected: usize,
        /// Number of arguments supplied
        got: usize,
    },
}

/// Every field error found during one population pass, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<FieldError>,
}

impl AggregateError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// The collected errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Consume the aggregate and return the collected errors.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            writeln!(f, "1 error occurred:")?;
        } else {
            writeln!(f, "{} errors occurred:", self.errors.len())?;
        }
        for error in &self.errors {
            write!(f, "\n* {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

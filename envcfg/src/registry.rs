//! Converter registry keyed by the produced type
//!
//! A [`Registry`] stores at most one converter per target type. Converters are
//! plain functions or closures taking one to four `&str` arguments and returning
//! `Result<T, E>` where `E: Display`. The registry erases them into a single
//! [`ConversionEntry`] shape that carries its arity and catches panics.

use crate::error::{ConvertError, Error};
use std::any::{self, Any, TypeId};
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

type Invoke = Box<dyn Fn(&[&str]) -> Result<Box<dyn Any>, String> + Send + Sync>;

/// A function that turns one or more strings into a typed value.
///
/// Implemented for every `Fn(&str, ..) -> Result<T, E>` with one to four
/// `&str` parameters, where `T: 'static` and `E: Display`. The `Sig` parameter
/// is the matching function-pointer type and only exists to keep the
/// implementations apart; callers never name it.
///
/// Functions that take a non-`&str` argument, take no arguments, or do not
/// return a `Result` are rejected at compile time:
///
/// ```compile_fail
/// let mut registry = envcfg::Registry::empty();
/// registry.register(|n: i32| -> Result<i32, String> { Ok(n) }).unwrap();
/// ```
///
/// ```compile_fail
/// let mut registry = envcfg::Registry::empty();
/// registry.register(|| -> Result<i32, String> { Ok(1) }).unwrap();
/// ```
///
/// ```compile_fail
/// let mut registry = envcfg::Registry::empty();
/// registry.register(|s: &str| -> usize { s.len() }).unwrap();
/// ```
///
/// The error type must implement `Display`:
///
/// ```compile_fail
/// #[derive(Debug)]
/// struct Opaque;
///
/// let mut registry = envcfg::Registry::empty();
/// registry.register(|s: &str| -> Result<i32, Opaque> { s.parse().map_err(|_| Opaque) }).unwrap();
/// ```
///
/// Every argument must be a `&str`, and the converter must be callable:
///
/// ```compile_fail
/// let mut registry = envcfg::Registry::empty();
/// registry.register(|a: &str, b: i32| -> Result<String, String> { Ok(format!("{a}{b}")) }).unwrap();
/// ```
///
/// ```compile_fail
/// let mut registry = envcfg::Registry::empty();
/// registry.register(42).unwrap();
/// ```
pub trait Converter<Sig>: Send + Sync + 'static {
    /// The type this converter produces.
    type Output: Any;

    /// Number of string arguments the converter accepts.
    const ARITY: usize;

    /// Run the converter. `args.len()` always equals [`Self::ARITY`].
    fn convert(&self, args: &[&str]) -> Result<Self::Output, String>;
}

impl<F, T, E> Converter<fn(&str) -> Result<T, E>> for F
where
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    T: Any,
    E: fmt::Display,
{
    type Output = T;
    const ARITY: usize = 1;

    fn convert(&self, args: &[&str]) -> Result<T, String> {
        self(args[0]).map_err(|e| e.to_string())
    }
}

impl<F, T, E> Converter<fn(&str, &str) -> Result<T, E>> for F
where
    F: Fn(&str, &str) -> Result<T, E> + Send + Sync + 'static,
    T: Any,
    E: fmt::Display,
{
    type Output = T;
    const ARITY: usize = 2;

    fn convert(&self, args: &[&str]) -> Result<T, String> {
        self(args[0], args[1]).map_err(|e| e.to_string())
    }
}

impl<F, T, E> Converter<fn(&str, &str, &str) -> Result<T, E>> for F
where
    F: Fn(&str, &str, &str) -> Result<T, E> + Send + Sync + 'static,
    T: Any,
    E: fmt::Display,
{
    type Output = T;
    const ARITY: usize = 3;

    fn convert(&self, args: &[&str]) -> Result<T, String> {
        self(args[0], args[1], args[2]).map_err(|e| e.to_string())
    }
}

impl<F, T, E> Converter<fn(&str, &str, &str, &str) -> Result<T, E>> for F
where
    F: Fn(&str, &str, &str, &str) -> Result<T, E> + Send + Sync + 'static,
    T: Any,
    E: fmt::Display,
{
    type Output = T;
    const ARITY: usize = 4;

    fn convert(&self, args: &[&str]) -> Result<T, String> {
        self(args[0], args[1], args[2], args[3]).map_err(|e| e.to_string())
    }
}

/// A registered converter with its arity, erased over the produced type.
pub struct ConversionEntry {
    arity: usize,
    converter: &'static str,
    type_name: &'static str,
    invoke: Invoke,
}

impl ConversionEntry {
    /// Number of string arguments the converter accepts.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Name of the wrapped converter function.
    pub fn converter(&self) -> &'static str {
        self.converter
    }

    /// Name of the type the converter produces.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Call the converter with `args`.
    ///
    /// A panic inside the converter is caught and returned as
    /// [`ConvertError::Panicked`]. This relies on unwinding; binaries built with
    /// `panic = "abort"` still abort.
    pub fn invoke(&self, args: &[&str]) -> Result<Box<dyn Any>, ConvertError> {
        if args.len() != self.arity {
            return Err(ConvertError::Arity {
                converter: self.converter,
                expected: self.arity,
                got: args.len(),
            });
        }

        match panic::catch_unwind(AssertUnwindSafe(|| (self.invoke)(args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(ConvertError::Failed(message)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(converter = self.converter, %message, "converter panicked");
                Err(ConvertError::Panicked {
                    converter: self.converter,
                    message,
                })
            }
        }
    }
}

impl fmt::Debug for ConversionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEntry")
            .field("arity", &self.arity)
            .field("converter", &self.converter)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Converters keyed by the exact type they produce.
///
/// # Example
///
/// ```rust
/// use envcfg::{EnvCfg, Registry, Source};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Port(u16);
///
/// #[derive(Default, EnvCfg)]
/// struct Config {
///     #[env(name = "PORT", default = "8080")]
///     port: Port,
/// }
///
/// fn parse_port(s: &str) -> Result<Port, std::num::ParseIntError> {
///     s.parse().map(Port)
/// }
///
/// # fn main() -> Result<(), envcfg::Error> {
/// let mut registry = Registry::new();
/// registry.register(parse_port)?;
///
/// let mut config = Config::default();
/// registry.populate_from_map(&Source::new(), &mut config)?;
/// assert_eq!(config.port, Port(8080));
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    entries: HashMap<TypeId, ConversionEntry>,
}

impl Registry {
    /// Create a registry with no converters.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry seeded with the built-in converters from [`crate::parsers`].
    ///
    /// # Panics
    ///
    /// Panics if a built-in converter cannot be registered, which means the
    /// built-in set itself is broken.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|e| panic!("could not seed default converters: {e}"))
    }

    /// Create a registry seeded with the built-in converters, returning any
    /// registration error instead of panicking.
    pub fn try_new() -> Result<Self, Error> {
        let mut registry = Self::empty();
        crate::parsers::register_defaults(&mut registry)?;
        Ok(registry)
    }

    /// Register `converter` for the type it produces.
    ///
    /// Fails with [`Error::DuplicateConverter`] if that type already has a
    /// converter. The existing one is kept.
    pub fn register<Sig, C>(&mut self, converter: C) -> Result<(), Error>
    where
        C: Converter<Sig>,
    {
        self.insert(any::type_name::<C>(), C::ARITY, move |args| {
            converter.convert(args)
        })
    }

    /// Register a converter that receives its arguments as a slice.
    ///
    /// Use this when the arity is only known at runtime. `f` is only ever
    /// called with exactly `arity` arguments.
    pub fn register_raw<T, E, F>(
        &mut self,
        converter: &'static str,
        arity: usize,
        f: F,
    ) -> Result<(), Error>
    where
        T: Any,
        E: fmt::Display,
        F: Fn(&[&str]) -> Result<T, E> + Send + Sync + 'static,
    {
        if arity == 0 {
            return Err(Error::ZeroArity { converter });
        }
        self.insert(converter, arity, move |args| f(args).map_err(|e| e.to_string()))
    }

    /// Register a converter that parses `T` from a JSON string.
    pub fn register_json<T>(&mut self) -> Result<(), Error>
    where
        T: serde::de::DeserializeOwned + 'static,
    {
        self.insert("serde_json::from_str", 1, |args| {
            serde_json::from_str::<T>(args[0]).map_err(|e| e.to_string())
        })
    }

    fn insert<T, F>(&mut self, converter: &'static str, arity: usize, f: F) -> Result<(), Error>
    where
        T: Any,
        F: Fn(&[&str]) -> Result<T, String> + Send + Sync + 'static,
    {
        let type_name = any::type_name::<T>();
        match self.entries.entry(TypeId::of::<T>()) {
            Entry::Occupied(existing) => {
                warn!(
                    type_name,
                    converter,
                    existing = existing.get().converter,
                    "rejected duplicate converter"
                );
                Err(Error::DuplicateConverter {
                    type_name,
                    converter,
                })
            }
            Entry::Vacant(slot) => {
                let invoke: Invoke = Box::new(move |args: &[&str]| {
                    f(args).map(|value| Box::new(value) as Box<dyn Any>)
                });
                slot.insert(ConversionEntry {
                    arity,
                    converter,
                    type_name,
                    invoke,
                });
                debug!(type_name, converter, arity, "registered converter");
                Ok(())
            }
        }
    }

    /// Look up the converter for `T`.
    pub fn get<T: Any>(&self) -> Option<&ConversionEntry> {
        self.get_by_id(TypeId::of::<T>())
    }

    /// Look up a converter by exact type id.
    pub fn get_by_id(&self, id: TypeId) -> Option<&ConversionEntry> {
        self.entries.get(&id)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        types.sort_unstable();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Foo(String);

    #[derive(Debug, PartialEq)]
    struct Bar;

    type Baz = Foo;

    fn parse_foo(s: &str) -> Result<Foo, String> {
        Ok(Foo(s.to_string()))
    }

    fn parse_foo_upper(s: &str) -> Result<Foo, String> {
        Ok(Foo(s.to_uppercase()))
    }

    fn parse_pair(a: &str, b: &str) -> Result<(String, String), String> {
        Ok((a.to_string(), b.to_string()))
    }

    fn invoke<T: Any>(registry: &Registry, args: &[&str]) -> Result<T, ConvertError> {
        let entry = registry.get::<T>().expect("converter registered");
        entry
            .invoke(args)
            .map(|value| *value.downcast::<T>().expect("value has the registered type"))
    }

    #[test]
    fn test_register_and_invoke() {
        let mut registry = Registry::empty();
        registry.register(parse_foo).unwrap();

        let entry = registry.get::<Foo>().unwrap();
        assert_eq!(entry.arity(), 1);
        assert!(entry.converter().ends_with("parse_foo"));
        assert!(entry.type_name().ends_with("Foo"));
        assert_eq!(invoke::<Foo>(&registry, &["hi"]).unwrap(), Foo("hi".into()));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::empty();
        registry.register(parse_foo).unwrap();

        let err = registry.register(parse_foo_upper).unwrap_err();
        match err {
            Error::DuplicateConverter {
                type_name,
                converter,
            } => {
                assert!(type_name.ends_with("Foo"));
                assert!(converter.ends_with("parse_foo_upper"));
            }
            other => panic!("Expected DuplicateConverter, got {other:?}"),
        }

        // First registration keeps working
        assert_eq!(registry.len(), 1);
        assert_eq!(invoke::<Foo>(&registry, &["hi"]).unwrap(), Foo("hi".into()));
    }

    #[test]
    fn test_type_alias_shares_converter() {
        let mut registry = Registry::empty();
        registry.register(parse_foo).unwrap();

        let err = registry
            .register(|s: &str| -> Result<Baz, String> { Ok(Foo(s.into())) })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateConverter { .. }));
    }

    #[test]
    fn test_distinct_types_do_not_collide() {
        let mut registry = Registry::empty();
        registry.register(parse_foo).unwrap();
        registry
            .register(|_: &str| -> Result<Bar, String> { Ok(Bar) })
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains::<Bar>());
    }

    #[test]
    fn test_multi_argument_converter() {
        let mut registry = Registry::empty();
        registry.register(parse_pair).unwrap();

        assert_eq!(registry.get::<(String, String)>().unwrap().arity(), 2);
        assert_eq!(
            invoke::<(String, String)>(&registry, &["a", "b"]).unwrap(),
            ("a".to_string(), "b".to_string())
        );
    }

    #[test]
    fn test_invoke_with_wrong_argument_count() {
        let mut registry = Registry::empty();
        registry.register(parse_pair).unwrap();

        let err = invoke::<(String, String)>(&registry, &["a"]).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Arity {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_returned_error_is_stringified() {
        let mut registry = Registry::empty();
        registry
            .register(|_: &str| -> Result<Foo, String> { Err("oops".to_string()) })
            .unwrap();

        let err = invoke::<Foo>(&registry, &["x"]).unwrap_err();
        assert_eq!(err, ConvertError::Failed("oops".to_string()));
    }

    #[test]
    fn test_panic_is_contained() {
        let mut registry = Registry::empty();
        registry
            .register(|_: &str| -> Result<Foo, String> { panic!("I panicked") })
            .unwrap();

        let err = invoke::<Foo>(&registry, &["x"]).unwrap_err();
        match err {
            ConvertError::Panicked { converter, message } => {
                assert!(converter.contains("test_panic_is_contained"));
                assert_eq!(message, "I panicked");
            }
            other => panic!("Expected Panicked, got {other:?}"),
        }
    }

    #[test]
    fn test_formatted_panic_payload() {
        let mut registry = Registry::empty();
        registry
            .register(|s: &str| -> Result<Foo, String> { panic!("bad input {s}") })
            .unwrap();

        let err = invoke::<Foo>(&registry, &["x"]).unwrap_err();
        assert!(err.to_string().ends_with("panicked: bad input x"));
    }

    #[test]
    fn test_register_raw_zero_arity() {
        let mut registry = Registry::empty();
        let err = registry
            .register_raw("nothing", 0, |_: &[&str]| -> Result<Foo, String> {
                Ok(Foo(String::new()))
            })
            .unwrap_err();
        assert_eq!(err, Error::ZeroArity { converter: "nothing" });
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_raw_joins_arguments() {
        let mut registry = Registry::empty();
        registry
            .register_raw("join", 3, |args: &[&str]| -> Result<Foo, String> {
                Ok(Foo(args.join("-")))
            })
            .unwrap();

        assert_eq!(registry.get::<Foo>().unwrap().converter(), "join");
        assert_eq!(
            invoke::<Foo>(&registry, &["a", "b", "c"]).unwrap(),
            Foo("a-b-c".into())
        );
    }

    #[test]
    fn test_register_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Limits {
            max: u32,
        }

        let mut registry = Registry::empty();
        registry.register_json::<Limits>().unwrap();

        assert_eq!(
            invoke::<Limits>(&registry, &[r#"{"max": 3}"#]).unwrap(),
            Limits { max: 3 }
        );
        assert!(matches!(
            invoke::<Limits>(&registry, &["not json"]),
            Err(ConvertError::Failed(_))
        ));
    }

    #[test]
    fn test_new_registry_is_seeded() {
        let registry = Registry::new();
        assert!(registry.contains::<String>());
        assert!(registry.contains::<u16>());
        assert!(registry.contains::<std::time::Duration>());
        assert!(!registry.contains::<Foo>());
    }

    #[test]
    fn test_debug_lists_types() {
        let mut registry = Registry::empty();
        registry.register(parse_foo).unwrap();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("Foo"));
    }
}

//! Attribute parsing for `#[env(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from the struct
//! and its fields during macro expansion.

use syn::{Attribute, Field, LitStr};

/// Separator between keys and between defaults; must match `envcfg::populate::DELIMITER`.
const DELIMITER: char = ',';

/// Parsed struct-level `#[env(...)]` attributes.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prefix prepended to every key of the struct.
    pub prefix: String,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let mut seen_prefix = false;

        for attr in attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    if seen_prefix {
                        return Err(meta.error("duplicate env attribute `prefix`"));
                    }
                    seen_prefix = true;
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.prefix = lit.value();
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Parsed `#[env(...)]` attributes from a struct field.
#[derive(Debug)]
pub struct FieldAttrs {
    /// Source keys, already prefixed and joined with the delimiter.
    pub keys: String,

    /// Default values joined with the delimiter, if any.
    pub default: Option<String>,
}

impl FieldAttrs {
    /// Extract `#[env(...)]` attributes from a struct field.
    ///
    /// Returns `None` for fields without an `env` attribute; they are not populated.
    pub fn from_field(field: &Field, prefix: &str) -> syn::Result<Option<Self>> {
        let mut tagged = false;
        let mut name: Option<LitStr> = None;
        let mut default: Option<LitStr> = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }
            tagged = true;

            // Bare #[env] has no list to parse
            if matches!(attr.meta, syn::Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // name = "KEY" or name = "KEY1,KEY2"
                if meta.path.is_ident("name") {
                    if name.is_some() {
                        return Err(meta.error("duplicate env attribute `name`"));
                    }
                    name = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                // default = "value" or default = "v1,v2"
                if meta.path.is_ident("default") {
                    if default.is_some() {
                        return Err(meta.error("duplicate env attribute `default`"));
                    }
                    default = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        if !tagged {
            return Ok(None);
        }

        let keys: Vec<String> = match &name {
            Some(lit) => {
                let value = lit.value();
                let keys: Vec<String> = value
                    .split(DELIMITER)
                    .map(|k| k.trim().to_string())
                    .collect();
                if keys.iter().any(String::is_empty) {
                    return Err(syn::Error::new_spanned(
                        lit,
                        "environment variable names must not be empty",
                    ));
                }
                keys
            }
            None => {
                let ident = field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "EnvCfg only supports named fields")
                })?;
                vec![ident.to_string().to_uppercase()]
            }
        };

        if let Some(lit) = &default {
            let count = lit.value().split(DELIMITER).count();
            if count != keys.len() {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!(
                        "default lists {} value(s) but name lists {} key(s)",
                        count,
                        keys.len()
                    ),
                ));
            }
        }

        let keys = keys
            .iter()
            .map(|key| format!("{prefix}{key}"))
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string());

        Ok(Some(Self {
            keys,
            default: default.map(|lit| lit.value()),
        }))
    }
}

//! Building sources from environment-style `KEY=VALUE` lists

use crate::populate::Source;

/// Convert `KEY=VALUE` entries into a [`Source`].
///
/// Each entry is split on its first `=`, so values may themselves contain `=`.
/// An entry without `=` maps its whole text to an empty value. Later entries
/// overwrite earlier ones with the same key.
pub fn env_list_to_map<I, S>(entries: I) -> Source
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| {
            let entry = entry.as_ref();
            match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (entry.to_string(), String::new()),
            }
        })
        .collect()
}

/// Snapshot the process environment as a [`Source`].
///
/// Variables that are not valid Unicode are converted lossily.
pub fn environment() -> Source {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

//! Deserialization helpers for query strings and partial-update bodies.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Treats a missing or empty string as `None`.
///
/// Query filters use this so `?grade=` means "no constraint".
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.is_empty()))
}

/// Three-state field for partial updates.
///
/// Pair with `#[serde(default)]`: an absent key stays `None` (leave unchanged),
/// `null` or `""` becomes `Some(None)` (clear), anything else is parsed with
/// `FromStr` into `Some(Some(value))`.
pub fn deserialize_clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(Some(None)),
        Some(s) if s.trim().is_empty() => Ok(Some(None)),
        Some(s) => s
            .parse::<T>()
            .map(|value| Some(Some(value)))
            .map_err(serde::de::Error::custom),
    }
}

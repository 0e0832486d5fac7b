//! Boolean option fields that also accept strings.
//!
//! Environment overlays hand every value over as a string, so
//! `QUIRE_RENDER_TABLES=false` arrives as `"false"` rather than `false`.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// Parse one of `true/false`, `yes/no`, `on/off`, `1/0` (case-insensitive).
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Deserialize a `bool` from a boolean or any text [`parse_flag`] accepts.
pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => parse_flag(&s)
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&s), &"a boolean")),
    }
}

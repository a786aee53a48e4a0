// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! List-field normalization.
//!
//! Front matter list fields accept either a YAML sequence or a single
//! comma-separated string, optionally wrapped in `[...]` with quoted items.
//! Both forms normalize to `Vec<String>`.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use std::fmt;

/// Split a comma-separated list string into trimmed, unquoted items.
pub fn split_list(raw: &str) -> Vec<String> {
    let inner = raw.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);
    inner
        .split(',')
        .map(unquote)
        .filter(|s| !s.is_empty())
        .collect()
}

fn unquote(item: &str) -> String {
    let item = item.trim();
    let item = item
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| item.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(item);
    item.trim().to_string()
}

/// Deserialize a sequence-or-string field into `Vec<String>`.
pub fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a sequence of strings or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(split_list(value))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<serde_yaml::Value>()? {
                match item {
                    serde_yaml::Value::String(s) => items.push(s.trim().to_string()),
                    serde_yaml::Value::Number(n) => items.push(n.to_string()),
                    other => {
                        return Err(de::Error::custom(format!(
                            "list items must be strings, found {other:?}"
                        )))
                    }
                }
            }
            Ok(items)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ListVisitor)
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;

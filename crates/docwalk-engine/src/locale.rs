//! Locale fan-out for localized fields
//!
//! A localized field stores `{ "<locale>": value, ... }`. [`LocaleValues`]
//! splits such a map into one entry per configured locale and puts the
//! results back together afterwards. Unlocalized fields get a single entry.

use docwalk_schema::{DataPath, Document};
use serde_json::Value;

use crate::error::TraversalConfigurationError;

/// One value to visit
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleEntry {
    /// Locale the value belongs to; `None` for unlocalized fields
    pub locale: Option<String>,
    /// Stored value; `None` if absent
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Flat,
    Absent,
    Null,
    /// Original map; configured locales are overwritten on reassembly
    Map(Document),
}

/// Per-locale view of one field's value
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleValues {
    entries: Vec<LocaleEntry>,
    stored: Stored,
}

impl LocaleValues {
    /// Split `raw` into the values to visit
    ///
    /// With `localized` false, or no configured locales, there is exactly one
    /// entry holding `raw`. Otherwise there is one entry per locale in
    /// configured order; locales missing from the stored map are absent.
    ///
    /// # Errors
    /// `ShapeMismatch` if a localized value is neither a map, `null` nor absent
    pub fn resolve(
        localized: bool,
        locales: &[&str],
        raw: Option<Value>,
        path: &DataPath,
    ) -> Result<Self, TraversalConfigurationError> {
        if !localized || locales.is_empty() {
            return Ok(Self {
                entries: vec![LocaleEntry {
                    locale: None,
                    value: raw,
                }],
                stored: Stored::Flat,
            });
        }

        let mut stored = match raw {
            None => Stored::Absent,
            Some(Value::Null) => Stored::Null,
            Some(Value::Object(map)) => Stored::Map(map),
            Some(other) => {
                return Err(TraversalConfigurationError::shape_mismatch(
                    path,
                    "locale map",
                    &other,
                ))
            }
        };

        let entries = locales
            .iter()
            .map(|&code| LocaleEntry {
                locale: Some(code.to_string()),
                value: match &mut stored {
                    Stored::Map(map) => map.get_mut(code).map(Value::take),
                    _ => None,
                },
            })
            .collect();

        Ok(Self { entries, stored })
    }

    /// Check if the value was split by locale
    #[inline]
    #[must_use]
    pub fn is_localized(&self) -> bool {
        !matches!(self.stored, Stored::Flat)
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LocaleEntry] {
        &self.entries
    }

    #[inline]
    pub fn entries_mut(&mut self) -> &mut [LocaleEntry] {
        &mut self.entries
    }

    /// Put the visited values back together
    ///
    /// Locale keys that were stored but are not configured keep their value.
    /// A localized field that was absent or `null` stays that way unless some
    /// locale produced a value.
    #[must_use]
    pub fn reassemble(self) -> Option<Value> {
        let untouched = self.entries.iter().all(|e| e.value.is_none());
        let mut map = match self.stored {
            Stored::Flat => return self.entries.into_iter().next().and_then(|e| e.value),
            Stored::Map(map) => map,
            Stored::Absent if untouched => return None,
            Stored::Null if untouched => return Some(Value::Null),
            Stored::Absent | Stored::Null => Document::new(),
        };

        for entry in self.entries {
            let Some(locale) = entry.locale else {
                continue;
            };
            match entry.value {
                Some(value) => {
                    map.insert(locale, value);
                }
                None => {
                    map.shift_remove(&locale);
                }
            }
        }
        Some(Value::Object(map))
    }
}

//! Cards: the records queries filter and aggregate over

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A card: number, name, type, tags, and string-typed property values.
/// A property absent from the map is unset (NULL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique card number
    pub number: u64,
    /// Card name
    pub name: String,
    /// Card type name
    pub card_type: String,
    /// Tags on the card
    pub tags: Vec<String>,
    /// Property values, keyed by lower-cased property name
    properties: HashMap<String, String>,
}

impl Card {
    /// Create a card with no property values
    pub fn new(number: u64, name: impl Into<String>, card_type: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            card_type: card_type.into(),
            tags: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Set a property value
    pub fn with_property(mut self, name: &str, value: impl Into<String>) -> Self {
        self.properties.insert(name.to_lowercase(), value.into());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Read a column value. `Number`, `Name` and `Type` are built in;
    /// anything else reads the property map. `None` means unset.
    pub fn value_of(&self, column: &str) -> Option<String> {
        if column.eq_ignore_ascii_case("number") {
            return Some(self.number.to_string());
        }
        if column.eq_ignore_ascii_case("name") {
            return Some(self.name.clone());
        }
        if column.eq_ignore_ascii_case("type") {
            return Some(self.card_type.clone());
        }
        self.properties.get(&column.to_lowercase()).cloned()
    }

    /// Whether the card carries a tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

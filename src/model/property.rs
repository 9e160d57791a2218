//! Notion property values and their wire encoding.
//!
//! Each property kind the importer writes is one variant of
//! [`PropertyValue`]. Serializing a value produces exactly the JSON object the
//! Notion pages API expects under `properties.<name>`.

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};
use serde::Deserialize;
use serde_json::{json, Value};

/// Maximum number of characters Notion accepts in one text object.
pub const MAX_FIELD_LEN: usize = 2000;

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// The database's title column.
    Title(String),
    /// Long text, split into several text objects when longer than
    /// [`MAX_FIELD_LEN`].
    RichText(String),
    /// Single option by name.
    Select(String),
    /// One option per tag, order preserved.
    MultiSelect(Vec<String>),
    /// URL column; `None` clears it.
    Url(Option<String>),
}

impl PropertyValue {
    /// Wire name of the property kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::RichText(_) => "rich_text",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multi_select",
            Self::Url(_) => "url",
        }
    }

    /// Encode as the Notion property object.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Title(text) => json!({ "title": text_objects(text) }),
            Self::RichText(text) => json!({ "rich_text": text_objects(text) }),
            Self::Select(name) => json!({ "select": { "name": name } }),
            Self::MultiSelect(names) => {
                let options: Vec<Value> =
                    names.iter().map(|name| json!({ "name": name })).collect();
                json!({ "multi_select": options })
            }
            Self::Url(url) => json!({ "url": url }),
        }
    }

    /// Plain-text content of text-like values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Title(text) | Self::RichText(text) | Self::Select(text) => Some(text),
            Self::Url(url) => url.as_deref(),
            Self::MultiSelect(_) => None,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Split text into Notion text objects of at most [`MAX_FIELD_LEN`] characters.
fn text_objects(text: &str) -> Vec<Value> {
    split_chars(text, MAX_FIELD_LEN)
        .into_iter()
        .map(|chunk| json!({ "type": "text", "text": { "content": chunk } }))
        .collect()
}

/// Split after `max` characters. The second half is empty when the text fits.
#[must_use]
pub fn split_at_chars(text: &str, max: usize) -> (&str, &str) {
    let idx = text
        .char_indices()
        .nth(max)
        .map_or(text.len(), |(idx, _)| idx);
    text.split_at(idx)
}

/// Split a string into chunks of at most `max` characters.
///
/// Empty input yields no chunks.
#[must_use]
pub fn split_chars(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (chunk, tail) = split_at_chars(rest, max.max(1));
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// The full property set of one page, keyed by column name.
pub type PageProperties = BTreeMap<String, PropertyValue>;

/// Column names of the target Notion database.
///
/// Defaults match the recipe database template the importer was written for.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: String,
    pub ingredients: String,
    pub directions: String,
    pub directions_overflow: String,
    pub meal_type: String,
    pub status: String,
    pub url: String,
    pub tags: String,
    /// Column holding the content fingerprint used for upsert lookups.
    pub identity: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: "Recipe".to_string(),
            ingredients: "Ingredient list".to_string(),
            directions: "Recipe write-up".to_string(),
            directions_overflow: "Recipe write-up (cont.)".to_string(),
            meal_type: "Meal Type".to_string(),
            status: "Status".to_string(),
            url: "URL".to_string(),
            tags: "Tags".to_string(),
            identity: "Paprika Hash".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_select_keeps_every_tag() {
        let value = PropertyValue::MultiSelect(vec![
            "Dinner".to_string(),
            "Vegetarian".to_string(),
            "Quick".to_string(),
        ]);

        let wire = value.to_wire();
        let options = wire["multi_select"].as_array().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0]["name"], "Dinner");
        assert_eq!(options[1]["name"], "Vegetarian");
        assert_eq!(options[2]["name"], "Quick");
    }

    #[test]
    fn test_rich_text_chunks_long_content() {
        let text = "a".repeat(MAX_FIELD_LEN * 2 + 5);
        let wire = PropertyValue::RichText(text).to_wire();
        let parts = wire["rich_text"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0]["text"]["content"].as_str().unwrap().len(),
            MAX_FIELD_LEN
        );
        assert_eq!(parts[2]["text"]["content"].as_str().unwrap().len(), 5);
    }

    #[test]
    fn test_empty_rich_text_is_empty_array() {
        let wire = PropertyValue::RichText(String::new()).to_wire();
        assert_eq!(wire, json!({ "rich_text": [] }));
    }

    #[test]
    fn test_title_and_select_encoding() {
        assert_eq!(
            PropertyValue::Title("Pancakes".into()).to_wire(),
            json!({ "title": [{ "type": "text", "text": { "content": "Pancakes" } }] })
        );
        assert_eq!(
            PropertyValue::Select("From Paprika".into()).to_wire(),
            json!({ "select": { "name": "From Paprika" } })
        );
        assert_eq!(PropertyValue::Url(None).to_wire(), json!({ "url": null }));
    }

    #[test]
    fn test_split_chars_respects_char_boundaries() {
        let chunks = split_chars("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
        assert!(split_chars("", 10).is_empty());
    }

    #[test]
    fn test_split_is_character_based_not_word_based() {
        let (head, tail) = split_at_chars("hello world", 7);
        assert_eq!(head, "hello w");
        assert_eq!(tail, "orld");

        let (head, tail) = split_at_chars("", 7);
        assert_eq!((head, tail), ("", ""));
    }

    #[test]
    fn test_serialize_matches_wire() {
        let value = PropertyValue::Url(Some("https://example.com".into()));
        assert_eq!(serde_json::to_value(&value).unwrap(), value.to_wire());
    }
}

//! Data models for paprika2notion.
//!
//! - `SourceRecord` - a recipe as exported by Paprika
//! - `TargetRecord` - the normalized recipe written to Notion
//! - `PropertyValue` - typed Notion property values and their wire encoding

pub mod property;
pub mod source;
pub mod target;

pub use property::{
    split_at_chars, split_chars, PageProperties, PropertyNames, PropertyValue, MAX_FIELD_LEN,
};
pub use source::SourceRecord;
pub use target::{MealType, RecipeStatus, TargetRecord, IMPORTED};

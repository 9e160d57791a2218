//! Notion recipe model.
//!
//! A `TargetRecord` is the normalized form of a recipe, ready to be written
//! as one page of the recipe database.

use serde::{Deserialize, Serialize};

use super::property::{PageProperties, PropertyNames, PropertyValue};

/// Meal type options of the recipe database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Beverage,
    Brunch,
    Smoothie,
    Misc,
    /// Sentinel for pages created by the importer.
    Imported,
}

impl MealType {
    /// Option name as shown in Notion.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
            Self::Beverage => "Beverage",
            Self::Brunch => "Brunch",
            Self::Smoothie => "Smoothie",
            Self::Misc => "Misc",
            Self::Imported => IMPORTED,
        }
    }
}

/// Status options of the recipe database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipeStatus {
    Wishlist,
    Wip,
    TriedAndTested,
    /// Sentinel for pages created by the importer.
    Imported,
}

impl RecipeStatus {
    /// Option name as shown in Notion.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wishlist => "Wishlist",
            Self::Wip => "WIP",
            Self::TriedAndTested => "Tried and tested",
            Self::Imported => IMPORTED,
        }
    }
}

/// Option name shared by both sentinel values. Pages carrying it still need
/// a manual pass in Notion.
pub const IMPORTED: &str = "From Paprika";

/// A recipe in the shape of the Notion database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub title: String,
    /// Bulleted ingredient block.
    pub ingredients: String,
    /// Directions up to the field length limit.
    pub directions: String,
    /// Directions beyond the limit, empty when they fit.
    pub directions_overflow: String,
    pub meal_type: MealType,
    pub status: RecipeStatus,
    pub url: Option<String>,
    pub tags: Vec<String>,
    /// Content fingerprint of the source recipe.
    pub identity_key: String,
}

impl TargetRecord {
    /// Build the page property set using the given column names.
    #[must_use]
    pub fn to_properties(&self, names: &PropertyNames) -> PageProperties {
        let mut props = PageProperties::new();
        props.insert(names.title.clone(), PropertyValue::Title(self.title.clone()));
        props.insert(
            names.ingredients.clone(),
            PropertyValue::RichText(self.ingredients.clone()),
        );
        props.insert(
            names.directions.clone(),
            PropertyValue::RichText(self.directions.clone()),
        );
        props.insert(
            names.directions_overflow.clone(),
            PropertyValue::RichText(self.directions_overflow.clone()),
        );
        props.insert(
            names.meal_type.clone(),
            PropertyValue::Select(self.meal_type.as_str().to_string()),
        );
        props.insert(
            names.status.clone(),
            PropertyValue::Select(self.status.as_str().to_string()),
        );
        props.insert(names.url.clone(), PropertyValue::Url(self.url.clone()));
        props.insert(names.tags.clone(), PropertyValue::MultiSelect(self.tags.clone()));
        props.insert(
            names.identity.clone(),
            PropertyValue::RichText(self.identity_key.clone()),
        );
        props
    }
}

//! Paprika recipe → Notion recipe mapping.

use crate::model::{
    split_at_chars, MealType, RecipeStatus, SourceRecord, TargetRecord, MAX_FIELD_LEN,
};
use crate::sync::types::TransformError;

/// Prefix of every ingredient line.
pub const INGREDIENT_BULLET: &str = "• ";

/// Map a recipe to its Notion form.
///
/// # Errors
///
/// Returns a [`TransformError`] if the recipe has no title or hash, a tag
/// Notion would reject, or a NUL character in a text field.
pub fn transform(record: &SourceRecord) -> Result<TargetRecord, TransformError> {
    validate(record)?;

    let (directions, directions_overflow) = split_at_chars(&record.directions, MAX_FIELD_LEN);
    let url = (!record.source_url.trim().is_empty()).then(|| record.source_url.clone());

    Ok(TargetRecord {
        title: record.name.clone(),
        ingredients: bullet_list(&record.ingredients),
        directions: directions.to_string(),
        directions_overflow: directions_overflow.to_string(),
        meal_type: MealType::Imported,
        status: RecipeStatus::Imported,
        url,
        tags: record.categories.clone(),
        identity_key: record.hash.clone(),
    })
}

fn validate(record: &SourceRecord) -> Result<(), TransformError> {
    if record.name.trim().is_empty() {
        return Err(TransformError::EmptyTitle);
    }
    if record.hash.trim().is_empty() {
        return Err(TransformError::MissingHash);
    }

    let text_fields = [
        ("name", record.name.as_str()),
        ("ingredients", record.ingredients.as_str()),
        ("directions", record.directions.as_str()),
        ("source_url", record.source_url.as_str()),
    ];
    for (field, text) in text_fields {
        if text.contains('\0') {
            return Err(TransformError::ControlCharacter { field });
        }
    }

    if let Some(tag) = record.categories.iter().find(|t| t.contains(',') || t.contains('\0')) {
        return Err(TransformError::InvalidTag { tag: tag.clone() });
    }

    Ok(())
}

/// One bulleted line per non-blank ingredient line.
#[must_use]
pub fn bullet_list(ingredients: &str) -> String {
    ingredients
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("{INGREDIENT_BULLET}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> SourceRecord {
        SourceRecord {
            name: "Shakshuka".into(),
            hash: "h1".into(),
            ingredients: "4 eggs\n\n  1 can tomatoes  \n1 onion\n".into(),
            directions: "Fry onion.\nAdd tomatoes.\nCrack eggs.".into(),
            categories: vec!["Breakfast".into(), "Vegetarian".into(), "Breakfast".into()],
            source_url: "https://example.com/shakshuka".into(),
            ..SourceRecord::default()
        }
    }

    #[test]
    fn test_transform_maps_fields() {
        let target = transform(&recipe()).unwrap();

        assert_eq!(target.title, "Shakshuka");
        assert_eq!(target.ingredients, "• 4 eggs\n• 1 can tomatoes\n• 1 onion");
        assert_eq!(target.directions, "Fry onion.\nAdd tomatoes.\nCrack eggs.");
        assert!(target.directions_overflow.is_empty());
        assert_eq!(target.tags, vec!["Breakfast", "Vegetarian", "Breakfast"]);
        assert_eq!(target.url.as_deref(), Some("https://example.com/shakshuka"));
        assert_eq!(target.meal_type, MealType::Imported);
        assert_eq!(target.status, RecipeStatus::Imported);
        assert_eq!(target.identity_key, "h1");
    }

    #[test]
    fn test_long_directions_overflow() {
        let directions: String = "abcdé".repeat(MAX_FIELD_LEN / 5 * 2 + 1);
        let record = SourceRecord {
            directions: directions.clone(),
            ..recipe()
        };
        let target = transform(&record).unwrap();

        assert_eq!(target.directions.chars().count(), MAX_FIELD_LEN);
        assert_eq!(
            format!("{}{}", target.directions, target.directions_overflow),
            directions
        );
        assert_eq!(
            target.directions_overflow.chars().count(),
            directions.chars().count() - MAX_FIELD_LEN
        );
    }

    #[test]
    fn test_directions_exactly_at_limit_have_no_overflow() {
        let directions = "x".repeat(MAX_FIELD_LEN);
        let record = SourceRecord {
            directions: directions.clone(),
            ..recipe()
        };
        let target = transform(&record).unwrap();

        assert_eq!(target.directions, directions);
        assert!(target.directions_overflow.is_empty());
    }

    #[test]
    fn test_empty_url_becomes_none() {
        let record = SourceRecord {
            source_url: "  ".into(),
            ..recipe()
        };
        assert_eq!(transform(&record).unwrap().url, None);
    }

    #[test]
    fn test_rejects_malformed_recipes() {
        let untitled = SourceRecord {
            name: " ".into(),
            ..recipe()
        };
        assert_eq!(transform(&untitled), Err(TransformError::EmptyTitle));

        let unhashed = SourceRecord {
            hash: String::new(),
            ..recipe()
        };
        assert_eq!(transform(&unhashed), Err(TransformError::MissingHash));

        let bad_tag = SourceRecord {
            categories: vec!["Soups, stews".into()],
            ..recipe()
        };
        assert_eq!(
            transform(&bad_tag),
            Err(TransformError::InvalidTag {
                tag: "Soups, stews".into()
            })
        );

        let nul = SourceRecord {
            directions: "Stir\0".into(),
            ..recipe()
        };
        assert_eq!(
            transform(&nul),
            Err(TransformError::ControlCharacter { field: "directions" })
        );
    }

    #[test]
    fn test_url_without_scheme_is_copied_verbatim() {
        for url in ["www.bbcgoodfood.com/recipes/soup", "ftp://example.com/soup"] {
            let record = SourceRecord {
                source_url: url.into(),
                ..recipe()
            };
            assert_eq!(transform(&record).unwrap().url.as_deref(), Some(url));
        }
    }
}

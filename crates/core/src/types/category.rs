//! Grocery item categories.

use serde::{Deserialize, Serialize};

/// Error returned when a category name is not one of [`ItemCategory::ALL`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid item category: {0}")]
pub struct CategoryError(pub String);

/// Aisle a grocery item belongs to.
///
/// The set is closed; anything else typed into a form is rejected. Items
/// created without a category fall back to [`ItemCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "item_category", rename_all = "snake_case")
)]
pub enum ItemCategory {
    Produce,
    Deli,
    Bakery,
    Pantry,
    Frozen,
    #[default]
    Other,
}

impl ItemCategory {
    /// Every category, in the order offered by the item form.
    pub const ALL: [Self; 6] = [
        Self::Produce,
        Self::Deli,
        Self::Bakery,
        Self::Pantry,
        Self::Frozen,
        Self::Other,
    ];

    /// Display name, also used as the form value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "Produce",
            Self::Deli => "Deli",
            Self::Bakery => "Bakery",
            Self::Pantry => "Pantry",
            Self::Frozen => "Frozen",
            Self::Other => "Other",
        }
    }

    /// Parse a form value, treating a blank value as the default category.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` for a non-blank value that names no category.
    pub fn parse_or_default(s: &str) -> Result<Self, CategoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.parse()
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_other() {
        assert_eq!(ItemCategory::default(), ItemCategory::Other);
    }

    #[test]
    fn test_from_str_ignores_case() {
        assert_eq!("produce".parse::<ItemCategory>().unwrap(), ItemCategory::Produce);
        assert_eq!("FROZEN".parse::<ItemCategory>().unwrap(), ItemCategory::Frozen);
        assert_eq!("Deli".parse::<ItemCategory>().unwrap(), ItemCategory::Deli);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert_eq!(
            "Dairy".parse::<ItemCategory>(),
            Err(CategoryError("Dairy".to_string()))
        );
        assert!(ItemCategory::parse_or_default("Dairy").is_err());
    }

    #[test]
    fn test_blank_category_defaults() {
        assert_eq!(
            ItemCategory::parse_or_default("  ").unwrap(),
            ItemCategory::Other
        );
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for category in ItemCategory::ALL {
            assert_eq!(category.to_string().parse::<ItemCategory>().unwrap(), category);
        }
    }
}

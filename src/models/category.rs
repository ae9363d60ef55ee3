//! Category model
//!
//! A named classification bucket for either ingredients or recipes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{check_text, Field, ValidationResult};
use super::Identity;

/// Which kind of entity a category may classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Ingredient,
    Recipe,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Ingredient => "ingredient",
            CategoryKind::Recipe => "recipe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ingredient" => Some(CategoryKind::Ingredient),
            "recipe" => Some(CategoryKind::Recipe),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category with a sort position.
///
/// `Category::default()` is an unvalidated placeholder; everything else goes
/// through [`Category::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Category {
    id: Identity,
    name: String,
    kind: CategoryKind,
    sort_order: i32,
}

impl Category {
    /// Create a category. Only the name is validated.
    pub fn new(name: &str, kind: CategoryKind, sort_order: i32) -> ValidationResult<Self> {
        check_text(Field::Name, name)?;

        Ok(Self {
            id: Identity::Unpersisted,
            name: name.to_string(),
            kind,
            sort_order,
        })
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.assign_id(id);
        self
    }

    pub fn assign_id(&mut self, id: Uuid) {
        self.id = Identity::Persisted(id);
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
}

//! Daily Intake model
//!
//! A named log of consumed ingredients and recipes. Entries reference their
//! target by id only; which collection the id belongs to is decided at
//! resolve time.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::validation::{check_text, is_valid_name, Field, ValidationResult};
use super::{Identity, Ingredient, Nutrition, Recipe};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Entry references {0}, which is neither an ingredient nor a recipe")]
    UnknownEntity(Uuid),
}

/// One consumed item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyIntakeEntry {
    id: Identity,
    entity_id: Uuid,
    amount: i32,
    sort_order: i32,
}

impl DailyIntakeEntry {
    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn entity_id(&self) -> Uuid {
        self.entity_id
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

/// A named, ordered intake log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyIntake {
    id: Identity,
    name: String,
    entries: Vec<DailyIntakeEntry>,
}

/// Sort order of an entry appended after `len` others
fn next_sort_order(len: usize) -> Option<i32> {
    i32::try_from(len).ok()
}

impl DailyIntake {
    pub fn new(name: &str) -> ValidationResult<Self> {
        check_text(Field::Name, name)?;

        Ok(Self {
            id: Identity::Unpersisted,
            name: name.to_string(),
            entries: Vec::new(),
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

    pub fn entries(&self) -> &[DailyIntakeEntry] {
        &self.entries
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        if !is_valid_name(name) {
            tracing::warn!("Daily intake '{}': rejected name {:?}", self.name, name);
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Append an entry at the end of the log. Non-positive amounts are ignored.
    pub fn add_entry(&mut self, entity_id: Uuid, amount: i32) -> bool {
        if amount <= 0 {
            tracing::warn!("Daily intake '{}': rejected amount {} for {}", self.name, amount, entity_id);
            return false;
        }
        let Some(sort_order) = next_sort_order(self.entries.len()) else {
            tracing::warn!("Daily intake '{}': entry list is full", self.name);
            return false;
        };
        self.entries.push(DailyIntakeEntry {
            id: Identity::Unpersisted,
            entity_id,
            amount,
            sort_order,
        });
        true
    }

    pub fn add_ingredient(&mut self, ingredient: &Ingredient, amount: i32) -> bool {
        match ingredient.id().uuid() {
            Some(id) => self.add_entry(id, amount),
            None => {
                tracing::warn!("Daily intake '{}': ingredient '{}' is not saved", self.name, ingredient.name());
                false
            }
        }
    }

    pub fn add_recipe(&mut self, recipe: &Recipe, amount: i32) -> bool {
        match recipe.id().uuid() {
            Some(id) => self.add_entry(id, amount),
            None => {
                tracing::warn!("Daily intake '{}': recipe '{}' is not saved", self.name, recipe.name());
                false
            }
        }
    }

    /// Record the storage id of the entry at position `index`
    pub fn assign_entry_id(&mut self, index: usize, id: Uuid) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.id = Identity::Persisted(id);
                true
            }
            None => false,
        }
    }

    /// Resolve every entry against ingredients first, then recipes.
    pub fn resolve(&self, sources: &impl IntakeSources) -> Result<Vec<ResolvedEntry>, ResolveError> {
        let mut entries: Vec<&DailyIntakeEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.sort_order);

        entries
            .into_iter()
            .map(|entry| {
                let target = if let Some(ingredient) = sources.ingredient(entry.entity_id) {
                    EntryTarget::Ingredient(ingredient)
                } else if let Some(recipe) = sources.recipe(entry.entity_id) {
                    EntryTarget::Recipe(recipe)
                } else {
                    return Err(ResolveError::UnknownEntity(entry.entity_id));
                };
                Ok(ResolvedEntry {
                    entity_id: entry.entity_id,
                    amount: entry.amount,
                    sort_order: entry.sort_order,
                    target,
                })
            })
            .collect()
    }
}

/// The two collections an entry id may point into
pub trait IntakeSources {
    fn ingredient(&self, id: Uuid) -> Option<Ingredient>;
    fn recipe(&self, id: Uuid) -> Option<Recipe>;
}

impl<I, R> IntakeSources for (I, R)
where
    I: Fn(Uuid) -> Option<Ingredient>,
    R: Fn(Uuid) -> Option<Recipe>,
{
    fn ingredient(&self, id: Uuid) -> Option<Ingredient> {
        (self.0)(id)
    }

    fn recipe(&self, id: Uuid) -> Option<Recipe> {
        (self.1)(id)
    }
}

/// Preloaded ingredients and recipes keyed by id
#[derive(Debug, Clone, Default)]
pub struct IntakeCatalog {
    pub ingredients: HashMap<Uuid, Ingredient>,
    pub recipes: HashMap<Uuid, Recipe>,
}

impl IntakeSources for IntakeCatalog {
    fn ingredient(&self, id: Uuid) -> Option<Ingredient> {
        self.ingredients.get(&id).cloned()
    }

    fn recipe(&self, id: Uuid) -> Option<Recipe> {
        self.recipes.get(&id).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "entity", rename_all = "lowercase")]
pub enum EntryTarget {
    Ingredient(Ingredient),
    Recipe(Recipe),
}

/// An entry joined with the ingredient or recipe it references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    pub entity_id: Uuid,
    pub amount: i32,
    pub sort_order: i32,
    pub target: EntryTarget,
}

impl ResolvedEntry {
    pub fn name(&self) -> &str {
        match &self.target {
            EntryTarget::Ingredient(ingredient) => ingredient.name(),
            EntryTarget::Recipe(recipe) => recipe.name(),
        }
    }

    /// Per-100 g values for an ingredient, aggregated totals for a recipe
    pub fn nutrition(&self) -> Nutrition {
        match &self.target {
            EntryTarget::Ingredient(ingredient) => ingredient.nutrition(),
            EntryTarget::Recipe(recipe) => recipe.nutrition(),
        }
    }

    pub fn is_recipe(&self) -> bool {
        matches!(self.target, EntryTarget::Recipe(_))
    }
}

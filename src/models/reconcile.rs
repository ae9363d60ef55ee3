//! Recipe measurement reconciliation
//!
//! Merges a caller-submitted recipe into the stored one and reports which
//! measurements were updated, deleted and inserted so storage can apply
//! exactly those rows.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::{Identity, Ingredient, IngredientMeasurement, Recipe};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Ingredient {0} not found")]
    IngredientNotFound(Uuid),

    #[error("New measurement '{note}' references an unsaved ingredient")]
    UnpersistedIngredient { note: String },

    #[error("Cannot reconcile recipe {current} with recipe {desired}")]
    RecipeMismatch { current: Identity, desired: Identity },
}

/// Source of ingredients for newly added measurements
pub trait IngredientLookup {
    fn ingredient(&self, id: Uuid) -> Option<Ingredient>;
}

impl<F> IngredientLookup for F
where
    F: Fn(Uuid) -> Option<Ingredient>,
{
    fn ingredient(&self, id: Uuid) -> Option<Ingredient> {
        self(id)
    }
}

impl IngredientLookup for HashMap<Uuid, Ingredient> {
    fn ingredient(&self, id: Uuid) -> Option<Ingredient> {
        self.get(&id).cloned()
    }
}

/// Measurement change sets produced by [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeChanges {
    pub updated: Vec<IngredientMeasurement>,
    pub deleted: Vec<IngredientMeasurement>,
    pub inserted: Vec<IngredientMeasurement>,
}

impl RecipeChanges {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty() && self.inserted.is_empty()
    }
}

/// Bring `current` in line with `desired`.
///
/// Measurements are matched by their own id, never by ingredient, so swapping
/// the ingredient of an existing measurement is an update. Measurements in
/// `desired` without an id are inserted with their ingredient fetched from
/// `lookup`. On error `current` is left as it was.
pub fn reconcile(
    current: &mut Recipe,
    desired: &Recipe,
    lookup: &impl IngredientLookup,
) -> Result<RecipeChanges, ReconcileError> {
    if desired.id().is_persisted() && desired.id() != current.id() {
        return Err(ReconcileError::RecipeMismatch {
            current: current.id(),
            desired: desired.id(),
        });
    }

    let mut pending = Vec::new();
    for wanted in desired.measurements().iter().filter(|m| !m.id().is_persisted()) {
        let ingredient_id = wanted
            .ingredient_id()
            .uuid()
            .ok_or_else(|| ReconcileError::UnpersistedIngredient {
                note: wanted.note().to_string(),
            })?;
        let ingredient = lookup
            .ingredient(ingredient_id)
            .ok_or(ReconcileError::IngredientNotFound(ingredient_id))?;
        let mut measurement = wanted.clone();
        measurement.set_ingredient(ingredient);
        pending.push(measurement);
    }

    let mut changes = RecipeChanges::default();

    let existing = std::mem::take(current.measurements_mut());
    for mut measurement in existing {
        let wanted = desired
            .measurements()
            .iter()
            .find(|m| m.id().is_persisted() && m.id() == measurement.id());
        match wanted {
            Some(wanted) => {
                measurement.set_measurement(wanted.measurement());
                measurement.set_unit(wanted.unit());
                measurement.set_grams(wanted.grams());
                measurement.set_note(wanted.note());
                measurement.set_sort_order(wanted.sort_order());
                measurement.set_ingredient(wanted.ingredient().clone());
                changes.updated.push(measurement.clone());
                current.measurements_mut().push(measurement);
            }
            None => changes.deleted.push(measurement),
        }
    }

    for measurement in pending {
        if current.add_measurement(measurement.clone()) {
            changes.inserted.push(measurement);
        }
    }

    current.set_name(desired.name());
    current.set_instructions(desired.instructions());
    current.set_portion_amount(desired.portion_amount());
    current.set_category(Some(desired.category().clone()));

    tracing::debug!(
        "Reconciled recipe '{}': {} updated, {} deleted, {} inserted",
        current.name(),
        changes.updated.len(),
        changes.deleted.len(),
        changes.inserted.len()
    );

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryKind, MeasurementUnit};

    fn ingredient(name: &str) -> Ingredient {
        let category = Category::new("Pantry", CategoryKind::Ingredient, 0)
            .unwrap()
            .with_id(Identity::generate());
        Ingredient::new(name, 1.0, 1.0, 1.0, 100.0, category)
            .unwrap()
            .with_id(Identity::generate())
    }

    fn recipe_category() -> Category {
        Category::new("Dinner", CategoryKind::Recipe, 0)
            .unwrap()
            .with_id(Identity::generate())
    }

    fn measure(ingredient: &Ingredient, grams: f64, sort_order: i32) -> IngredientMeasurement {
        IngredientMeasurement::new(1.0, MeasurementUnit::Gram, grams, "Note", sort_order, ingredient.clone())
            .unwrap()
    }

    struct Fixture {
        current: Recipe,
        a: Ingredient,
        b: Ingredient,
        c: Ingredient,
        a_id: Uuid,
        b_id: Uuid,
    }

    fn fixture() -> Fixture {
        let (a, b, c) = (ingredient("Apple"), ingredient("Butter"), ingredient("Cinnamon"));
        let (a_id, b_id) = (Identity::generate(), Identity::generate());
        let recipe_id = Identity::generate();
        let mut current = Recipe::new("Apple Pie", "Bake", 4, recipe_category())
            .unwrap()
            .with_id(recipe_id);
        current.add_measurement(measure(&a, 10.0, 0).with_id(a_id));
        current.add_measurement(measure(&b, 20.0, 1).with_id(b_id));
        Fixture { current, a, b, c, a_id, b_id }
    }

    fn desired_for(fx: &Fixture) -> Recipe {
        Recipe::new("Apple Pie", "Bake", 4, fx.current.category().clone())
            .unwrap()
            .with_id(fx.current.id().uuid().unwrap())
    }

    fn catalog(ingredients: &[&Ingredient]) -> HashMap<Uuid, Ingredient> {
        ingredients
            .iter()
            .map(|i| (i.id().uuid().unwrap(), (*i).clone()))
            .collect()
    }

    #[test]
    fn test_update_delete_insert_round_trip() {
        let mut fx = fixture();
        let mut desired = desired_for(&fx);
        desired.add_measurement(measure(&fx.a, 99.0, 0).with_id(fx.a_id));
        desired.add_measurement(measure(&fx.c, 5.0, 1));

        let changes = reconcile(&mut fx.current, &desired, &catalog(&[&fx.c])).unwrap();

        assert_eq!(changes.updated.len(), 1);
        assert_eq!(changes.updated[0].id(), Identity::Persisted(fx.a_id));
        assert_eq!(changes.updated[0].grams(), 99.0);

        assert_eq!(changes.deleted.len(), 1);
        assert_eq!(changes.deleted[0].id(), Identity::Persisted(fx.b_id));

        assert_eq!(changes.inserted.len(), 1);
        assert_eq!(changes.inserted[0].ingredient_id(), fx.c.id());
        assert_eq!(changes.inserted[0].id(), Identity::Unpersisted);

        let merged: Vec<(Identity, f64)> = fx
            .current
            .measurements()
            .iter()
            .map(|m| (m.ingredient_id(), m.grams()))
            .collect();
        assert_eq!(merged, vec![(fx.a.id(), 99.0), (fx.c.id(), 5.0)]);
    }

    #[test]
    fn test_ingredient_swap_is_an_update() {
        let mut fx = fixture();
        let mut desired = desired_for(&fx);
        desired.add_measurement(measure(&fx.c, 10.0, 0).with_id(fx.a_id));
        desired.add_measurement(measure(&fx.b, 20.0, 1).with_id(fx.b_id));

        let changes = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap();
        assert_eq!(changes.updated.len(), 2);
        assert!(changes.deleted.is_empty());
        assert!(changes.inserted.is_empty());
        assert_eq!(fx.current.measurements()[0].id(), Identity::Persisted(fx.a_id));
        assert_eq!(fx.current.measurements()[0].ingredient().name(), "Cinnamon");
    }

    #[test]
    fn test_lookup_failure_leaves_current_untouched() {
        let mut fx = fixture();
        let before = fx.current.clone();
        let mut desired = desired_for(&fx);
        desired.set_name("Pear Pie");
        desired.add_measurement(measure(&fx.c, 5.0, 0));

        let err = reconcile(&mut fx.current, &desired, &|_: Uuid| -> Option<Ingredient> { None }).unwrap_err();
        assert_eq!(err, ReconcileError::IngredientNotFound(fx.c.id().uuid().unwrap()));
        assert_eq!(fx.current, before);
    }

    #[test]
    fn test_unsaved_ingredient_rejected() {
        let mut fx = fixture();
        let category = Category::new("Pantry", CategoryKind::Ingredient, 0).unwrap();
        let unsaved = Ingredient::new("Sugar", 1.0, 1.0, 1.0, 1.0, category).unwrap();
        let mut desired = desired_for(&fx);
        desired.add_measurement(measure(&unsaved, 5.0, 0));

        let err = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap_err();
        assert!(matches!(err, ReconcileError::UnpersistedIngredient { .. }));
    }

    #[test]
    fn test_mismatched_recipe_rejected() {
        let mut fx = fixture();
        let desired = Recipe::new("Other", "Bake", 1, recipe_category())
            .unwrap()
            .with_id(Identity::generate());
        let before = fx.current.clone();
        let err = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap_err();
        assert!(matches!(err, ReconcileError::RecipeMismatch { .. }));
        assert_eq!(fx.current, before);
    }

    #[test]
    fn test_unknown_persisted_measurement_ignored() {
        let mut fx = fixture();
        let mut desired = desired_for(&fx);
        desired.add_measurement(measure(&fx.a, 10.0, 0).with_id(fx.a_id));
        desired.add_measurement(measure(&fx.c, 3.0, 1).with_id(Identity::generate()));

        let changes = reconcile(&mut fx.current, &desired, &catalog(&[&fx.c])).unwrap();
        assert_eq!(changes.updated.len(), 1);
        assert_eq!(changes.deleted.len(), 1);
        assert!(changes.inserted.is_empty());
        assert_eq!(fx.current.measurements().len(), 1);
    }

    #[test]
    fn test_recipe_scalars_copied_through_setters() {
        let mut fx = fixture();
        let new_category = recipe_category();
        let mut desired = Recipe::new("Pear Pie", "Bake longer", 6, new_category.clone())
            .unwrap()
            .with_id(fx.current.id().uuid().unwrap());
        desired.add_measurement(measure(&fx.a, 10.0, 0).with_id(fx.a_id));

        let changes = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap();
        assert_eq!(changes.deleted.len(), 1);
        assert_eq!(fx.current.name(), "Pear Pie");
        assert_eq!(fx.current.instructions(), "Bake longer");
        assert_eq!(fx.current.portion_amount(), 6);
        assert_eq!(fx.current.category(), &new_category);
    }

    #[test]
    fn test_unpersisted_desired_recipe_accepted() {
        let mut fx = fixture();
        let desired = Recipe::new("Apple Pie", "Bake", 4, fx.current.category().clone()).unwrap();
        let changes = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap();
        assert_eq!(changes.deleted.len(), 2);
        assert!(fx.current.measurements().is_empty());
    }

    #[test]
    fn test_unchanged_measurements_reported_as_updated() {
        let mut fx = fixture();
        let mut desired = desired_for(&fx);
        desired.add_measurement(measure(&fx.a, 10.0, 0).with_id(fx.a_id));
        desired.add_measurement(measure(&fx.b, 20.0, 1).with_id(fx.b_id));
        let changes = reconcile(&mut fx.current, &desired, &catalog(&[])).unwrap();
        assert!(!changes.is_empty());
        assert!(changes.deleted.is_empty() && changes.inserted.is_empty());
        assert!(RecipeChanges::default().is_empty());
    }
}

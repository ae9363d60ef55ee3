//! Recipe model
//!
//! A recipe owns an ordered list of ingredient measurements and aggregates
//! their nutrients.

use serde::Serialize;
use uuid::Uuid;

use super::validation::{
    check_category_kind, check_portion_amount, check_text, is_blank, is_valid_portion_amount,
    Field, ValidationResult,
};
use super::{Category, CategoryKind, Identity, IngredientMeasurement, Nutrition, PER_GRAM};

/// A recipe with its ingredient measurements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    id: Identity,
    name: String,
    instructions: String,
    portion_amount: i32,
    category_id: Identity,
    category: Category,
    measurements: Vec<IngredientMeasurement>,
}

impl Recipe {
    /// Create a recipe without measurements. The category must be of kind Recipe.
    pub fn new(
        name: &str,
        instructions: &str,
        portion_amount: i32,
        category: Category,
    ) -> ValidationResult<Self> {
        check_text(Field::Name, name)?;
        check_text(Field::Instructions, instructions)?;
        check_portion_amount(portion_amount)?;
        check_category_kind("recipe", CategoryKind::Recipe, category.kind())?;

        Ok(Self {
            id: Identity::Unpersisted,
            name: name.to_string(),
            instructions: instructions.to_string(),
            portion_amount,
            category_id: category.id(),
            category,
            measurements: Vec::new(),
        })
    }

    /// Rebuild a stored recipe. Its name may be numeric and its category of
    /// either kind, since the setters allow both.
    pub fn restore(
        id: Uuid,
        name: String,
        instructions: String,
        portion_amount: i32,
        category: Category,
        measurements: Vec<IngredientMeasurement>,
    ) -> Self {
        let mut recipe = Self {
            id: Identity::Persisted(id),
            name,
            instructions,
            portion_amount,
            category_id: category.id(),
            category,
            measurements: Vec::with_capacity(measurements.len()),
        };
        for measurement in measurements {
            recipe.add_measurement(measurement);
        }
        recipe
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

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn portion_amount(&self) -> i32 {
        self.portion_amount
    }

    pub fn category_id(&self) -> Identity {
        self.category_id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn measurements(&self) -> &[IngredientMeasurement] {
        &self.measurements
    }

    pub(super) fn measurements_mut(&mut self) -> &mut Vec<IngredientMeasurement> {
        &mut self.measurements
    }

    /// Whether a measurement for this ingredient is already present
    pub fn contains_ingredient(&self, ingredient_id: Identity) -> bool {
        self.measurements
            .iter()
            .any(|m| m.ingredient_id() == ingredient_id)
    }

    /// Append a measurement unless its ingredient is already in the recipe.
    pub fn add_measurement(&mut self, measurement: IngredientMeasurement) -> bool {
        if self.contains_ingredient(measurement.ingredient_id()) {
            tracing::warn!(
                "Recipe '{}': ingredient '{}' already measured, ignoring",
                self.name,
                measurement.ingredient().name()
            );
            return false;
        }
        self.measurements.push(measurement);
        true
    }

    /// Remove a measurement by its own id (not by ingredient)
    pub fn remove_measurement(&mut self, id: Identity) -> bool {
        match self.measurements.iter().position(|m| m.id() == id) {
            Some(index) => {
                self.measurements.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        if is_blank(name) {
            tracing::warn!("Recipe '{}': rejected blank name", self.name);
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub fn set_instructions(&mut self, instructions: &str) -> bool {
        if is_blank(instructions) {
            tracing::warn!("Recipe '{}': rejected blank instructions", self.name);
            return false;
        }
        self.instructions = instructions.to_string();
        true
    }

    pub fn set_portion_amount(&mut self, portion_amount: i32) -> bool {
        if !is_valid_portion_amount(portion_amount) {
            tracing::warn!("Recipe '{}': rejected portion amount {}", self.name, portion_amount);
            return false;
        }
        self.portion_amount = portion_amount;
        true
    }

    /// Replace the category. No kind check is made here, unlike in [`Recipe::new`].
    pub fn set_category(&mut self, category: Option<Category>) -> bool {
        let Some(category) = category else {
            tracing::warn!("Recipe '{}': no category given", self.name);
            return false;
        };
        if category.kind() != CategoryKind::Recipe {
            tracing::warn!(
                "Recipe '{}': assigned {} category '{}'",
                self.name,
                category.kind(),
                category.name()
            );
        }
        self.category_id = category.id();
        self.category = category;
        true
    }

    fn weighted_sum(&self, nutrient: impl Fn(&IngredientMeasurement) -> f64) -> f64 {
        self.measurements
            .iter()
            .map(|m| nutrient(m) * m.grams() * PER_GRAM)
            .sum()
    }

    pub fn fat_amount(&self) -> f64 {
        self.weighted_sum(|m| m.ingredient().fat())
    }

    pub fn carbohydrate_amount(&self) -> f64 {
        self.weighted_sum(|m| m.ingredient().carbohydrates())
    }

    pub fn protein_amount(&self) -> f64 {
        self.weighted_sum(|m| m.ingredient().protein())
    }

    pub fn calorie_amount(&self) -> f64 {
        self.weighted_sum(|m| m.ingredient().calories())
    }

    /// All four totals at once
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            fat: self.fat_amount(),
            carbohydrates: self.carbohydrate_amount(),
            protein: self.protein_amount(),
            calories: self.calorie_amount(),
        }
    }
}

//! Ingredient Measurement model
//!
//! A quantity of one ingredient used in a recipe, with its own unit and gram equivalent.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{check_quantity, check_text, is_blank, Field, ValidationResult};
use super::{Identity, Ingredient, Nutrition};

/// Measurement unit as entered in a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    #[default]
    Gram,
    Hectogram,
    Kilogram,
    SpiceMeasurement,
    Teaspoon,
    Tablespoon,
    Milliliters,
    Centiliters,
    Deciliters,
    Liter,
    Piece,
    Small,
    Big,
    Clove,
}

impl MeasurementUnit {
    pub const ALL: [MeasurementUnit; 14] = [
        MeasurementUnit::Gram,
        MeasurementUnit::Hectogram,
        MeasurementUnit::Kilogram,
        MeasurementUnit::SpiceMeasurement,
        MeasurementUnit::Teaspoon,
        MeasurementUnit::Tablespoon,
        MeasurementUnit::Milliliters,
        MeasurementUnit::Centiliters,
        MeasurementUnit::Deciliters,
        MeasurementUnit::Liter,
        MeasurementUnit::Piece,
        MeasurementUnit::Small,
        MeasurementUnit::Big,
        MeasurementUnit::Clove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Gram => "gram",
            MeasurementUnit::Hectogram => "hectogram",
            MeasurementUnit::Kilogram => "kilogram",
            MeasurementUnit::SpiceMeasurement => "spice_measurement",
            MeasurementUnit::Teaspoon => "teaspoon",
            MeasurementUnit::Tablespoon => "tablespoon",
            MeasurementUnit::Milliliters => "milliliters",
            MeasurementUnit::Centiliters => "centiliters",
            MeasurementUnit::Deciliters => "deciliters",
            MeasurementUnit::Liter => "liter",
            MeasurementUnit::Piece => "piece",
            MeasurementUnit::Small => "small",
            MeasurementUnit::Big => "big",
            MeasurementUnit::Clove => "clove",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|unit| unit.as_str() == lower)
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measured amount of one ingredient, owned by a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientMeasurement {
    id: Identity,
    measurement: f64,
    unit: MeasurementUnit,
    grams: f64,
    note: String,
    sort_order: i32,
    ingredient_id: Identity,
    ingredient: Ingredient,
}

impl IngredientMeasurement {
    /// Create a measurement. Unit and sort order are taken as given.
    pub fn new(
        measurement: f64,
        unit: MeasurementUnit,
        grams: f64,
        note: &str,
        sort_order: i32,
        ingredient: Ingredient,
    ) -> ValidationResult<Self> {
        check_quantity(Field::Measurement, measurement)?;
        check_quantity(Field::Grams, grams)?;
        check_text(Field::Note, note)?;

        Ok(Self {
            id: Identity::Unpersisted,
            measurement,
            unit,
            grams,
            note: note.to_string(),
            sort_order,
            ingredient_id: ingredient.id(),
            ingredient,
        })
    }

    /// Rebuild a stored measurement. Setters accept zero quantities and
    /// numeric notes, which [`IngredientMeasurement::new`] would refuse.
    pub fn restore(
        id: Uuid,
        measurement: f64,
        unit: MeasurementUnit,
        grams: f64,
        note: String,
        sort_order: i32,
        ingredient: Ingredient,
    ) -> Self {
        Self {
            id: Identity::Persisted(id),
            measurement,
            unit,
            grams,
            note,
            sort_order,
            ingredient_id: ingredient.id(),
            ingredient,
        }
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

    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    pub fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    pub fn grams(&self) -> f64 {
        self.grams
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn ingredient_id(&self) -> Identity {
        self.ingredient_id
    }

    pub fn ingredient(&self) -> &Ingredient {
        &self.ingredient
    }

    /// Nutrients contributed by this measurement
    pub fn nutrition(&self) -> Nutrition {
        self.ingredient.nutrition().for_grams(self.grams)
    }

    /// Accepts zero; only negative values are ignored.
    pub fn set_measurement(&mut self, measurement: f64) -> bool {
        if measurement.is_nan() || measurement < 0.0 {
            tracing::warn!("Measurement of '{}': rejected measurement {}", self.ingredient.name(), measurement);
            return false;
        }
        self.measurement = measurement;
        true
    }

    pub fn set_unit(&mut self, unit: MeasurementUnit) {
        self.unit = unit;
    }

    /// Accepts zero; only negative values are ignored.
    pub fn set_grams(&mut self, grams: f64) -> bool {
        if grams.is_nan() || grams < 0.0 {
            tracing::warn!("Measurement of '{}': rejected grams {}", self.ingredient.name(), grams);
            return false;
        }
        self.grams = grams;
        true
    }

    /// Only blank notes are ignored; numeric notes are accepted here.
    pub fn set_note(&mut self, note: &str) -> bool {
        if is_blank(note) {
            tracing::warn!("Measurement of '{}': rejected blank note", self.ingredient.name());
            return false;
        }
        self.note = note.to_string();
        true
    }

    pub fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    /// Point the measurement at another ingredient, keeping `ingredient_id` in step
    pub fn set_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredient_id = ingredient.id();
        self.ingredient = ingredient;
    }
}

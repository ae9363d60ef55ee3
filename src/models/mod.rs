//! Data models
//!
//! The nutrition domain: validated entities, nutrient aggregation and
//! recipe reconciliation. No I/O happens here.

mod category;
mod daily_intake;
mod identity;
mod ingredient;
mod ingredient_measurement;
mod nutrition;
mod recipe;
mod reconcile;
pub mod validation;

pub use category::{Category, CategoryKind};
pub use daily_intake::{
    DailyIntake, DailyIntakeEntry, EntryTarget, IntakeCatalog, IntakeSources, ResolveError,
    ResolvedEntry,
};
pub use identity::Identity;
pub use ingredient::Ingredient;
pub use ingredient_measurement::{IngredientMeasurement, MeasurementUnit};
pub use nutrition::{Nutrition, PER_GRAM};
pub use recipe::Recipe;
pub use reconcile::{reconcile, IngredientLookup, RecipeChanges, ReconcileError};
pub use validation::{Field, ValidationError, ValidationResult};

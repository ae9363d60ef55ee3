//! Ingredient model
//!
//! A nutrition-bearing leaf entity. Nutrient values are per 100 g.

use serde::Serialize;
use uuid::Uuid;

use super::validation::{
    check_category_kind, check_quantity, check_text, is_valid_name, is_valid_quantity, Field,
    ValidationResult,
};
use super::{Category, CategoryKind, Identity, Nutrition};

/// An ingredient with nutritional information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    id: Identity,
    name: String,
    fat: f64,
    carbohydrates: f64,
    protein: f64,
    calories: f64,
    category_id: Identity,
    category: Category,
}

impl Ingredient {
    /// Create an ingredient. The category must be of kind Ingredient.
    pub fn new(
        name: &str,
        fat: f64,
        carbohydrates: f64,
        protein: f64,
        calories: f64,
        category: Category,
    ) -> ValidationResult<Self> {
        check_text(Field::Name, name)?;
        check_quantity(Field::Fat, fat)?;
        check_quantity(Field::Carbohydrates, carbohydrates)?;
        check_quantity(Field::Protein, protein)?;
        check_quantity(Field::Calories, calories)?;
        check_category_kind("ingredient", CategoryKind::Ingredient, category.kind())?;

        Ok(Self {
            id: Identity::Unpersisted,
            name: name.to_string(),
            fat,
            carbohydrates,
            protein,
            calories,
            category_id: category.id(),
            category,
        })
    }

    /// Rebuild a stored ingredient without construction checks.
    pub fn restore(
        id: Uuid,
        name: String,
        nutrition: Nutrition,
        category: Category,
    ) -> Self {
        Self {
            id: Identity::Persisted(id),
            name,
            fat: nutrition.fat,
            carbohydrates: nutrition.carbohydrates,
            protein: nutrition.protein,
            calories: nutrition.calories,
            category_id: category.id(),
            category,
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fat(&self) -> f64 {
        self.fat
    }

    pub fn carbohydrates(&self) -> f64 {
        self.carbohydrates
    }

    pub fn protein(&self) -> f64 {
        self.protein
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn category_id(&self) -> Identity {
        self.category_id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Nutrient values per 100 g
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            fat: self.fat,
            carbohydrates: self.carbohydrates,
            protein: self.protein,
            calories: self.calories,
        }
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        if !is_valid_name(name) {
            tracing::warn!("Ingredient '{}': rejected name {:?}", self.name, name);
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub fn set_fat(&mut self, fat: f64) -> bool {
        self.set_quantity(Field::Fat, fat)
    }

    pub fn set_carbohydrates(&mut self, carbohydrates: f64) -> bool {
        self.set_quantity(Field::Carbohydrates, carbohydrates)
    }

    pub fn set_protein(&mut self, protein: f64) -> bool {
        self.set_quantity(Field::Protein, protein)
    }

    pub fn set_calories(&mut self, calories: f64) -> bool {
        self.set_quantity(Field::Calories, calories)
    }

    /// Replace the category. No kind check is made here, unlike in [`Ingredient::new`].
    pub fn set_category(&mut self, category: Option<Category>) -> bool {
        let Some(category) = category else {
            tracing::warn!("Ingredient '{}': no category given", self.name);
            return false;
        };
        if category.kind() != CategoryKind::Ingredient {
            tracing::warn!(
                "Ingredient '{}': assigned {} category '{}'",
                self.name,
                category.kind(),
                category.name()
            );
        }
        self.category_id = category.id();
        self.category = category;
        true
    }

    fn set_quantity(&mut self, field: Field, value: f64) -> bool {
        if !is_valid_quantity(value) {
            tracing::warn!("Ingredient '{}': rejected {} {}", self.name, field, value);
            return false;
        }
        let slot = match field {
            Field::Fat => &mut self.fat,
            Field::Carbohydrates => &mut self.carbohydrates,
            Field::Protein => &mut self.protein,
            Field::Calories => &mut self.calories,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    fn category(kind: CategoryKind) -> Category {
        Category::new("Fish", kind, 1).unwrap().with_id(Identity::generate())
    }

    fn tuna() -> Ingredient {
        Ingredient::new("Tuna", 1.0, 2.0, 3.0, 4.0, category(CategoryKind::Ingredient)).unwrap()
    }

    #[test]
    fn test_create_ingredient_round_trips_fields() {
        let cat = category(CategoryKind::Ingredient);
        let ingredient = Ingredient::new("Tuna", 1.5, 2.5, 3.5, 120.0, cat.clone()).unwrap();
        assert_eq!(ingredient.id(), Identity::Unpersisted);
        assert_eq!(ingredient.name(), "Tuna");
        assert_eq!(ingredient.fat(), 1.5);
        assert_eq!(ingredient.carbohydrates(), 2.5);
        assert_eq!(ingredient.protein(), 3.5);
        assert_eq!(ingredient.calories(), 120.0);
        assert_eq!(ingredient.category_id(), cat.id());
        assert_eq!(ingredient.category(), &cat);
    }

    #[test]
    fn test_invalid_arguments_rejected_with_field() {
        let cases: [(&str, f64, f64, f64, f64, Field); 11] = [
            ("", 1.0, 1.0, 1.0, 1.0, Field::Name),
            ("123", 1.0, 1.0, 1.0, 1.0, Field::Name),
            ("123.456", 1.0, 1.0, 1.0, 1.0, Field::Name),
            ("Tuna", -1.0, 1.0, 1.0, 1.0, Field::Fat),
            ("Tuna", 0.0, 1.0, 1.0, 1.0, Field::Fat),
            ("Tuna", 1.0, -1.0, 1.0, 1.0, Field::Carbohydrates),
            ("Tuna", 1.0, 0.0, 1.0, 1.0, Field::Carbohydrates),
            ("Tuna", 1.0, 1.0, -1.0, 1.0, Field::Protein),
            ("Tuna", 1.0, 1.0, 0.0, 1.0, Field::Protein),
            ("Tuna", 1.0, 1.0, 1.0, -1.0, Field::Calories),
            ("Tuna", 1.0, 1.0, 1.0, 0.0, Field::Calories),
        ];
        for (name, fat, carbs, protein, calories, expected) in cases {
            let err = Ingredient::new(name, fat, carbs, protein, calories, category(CategoryKind::Ingredient))
                .unwrap_err();
            let field = match err {
                ValidationError::Blank { field }
                | ValidationError::Numeric { field, .. }
                | ValidationError::NotPositive { field, .. } => field,
                other => panic!("unexpected error {:?}", other),
            };
            assert_eq!(field, expected);
        }
    }

    #[test]
    fn test_recipe_category_rejected() {
        for (fat, calories) in [(1.0, 1.0), (0.5, 250.0), (30.0, 900.0)] {
            let err = Ingredient::new("Tuna", fat, 1.0, 1.0, calories, category(CategoryKind::Recipe))
                .unwrap_err();
            assert_eq!(
                err,
                ValidationError::CategoryKind {
                    entity: "ingredient",
                    expected: CategoryKind::Ingredient,
                    actual: CategoryKind::Recipe,
                }
            );
        }
    }

    #[test]
    fn test_setters_apply_valid_values() {
        let mut ingredient = tuna();
        assert!(ingredient.set_name("Salmon"));
        assert!(ingredient.set_fat(10.0));
        assert!(ingredient.set_carbohydrates(11.0));
        assert!(ingredient.set_protein(12.0));
        assert!(ingredient.set_calories(200.0));
        assert_eq!(ingredient.name(), "Salmon");
        assert_eq!(
            ingredient.nutrition(),
            Nutrition { fat: 10.0, carbohydrates: 11.0, protein: 12.0, calories: 200.0 }
        );
    }

    #[test]
    fn test_setters_ignore_invalid_values() {
        let mut ingredient = tuna();
        let before = ingredient.clone();
        assert!(!ingredient.set_name(""));
        assert!(!ingredient.set_name(" "));
        assert!(!ingredient.set_name("42"));
        assert!(!ingredient.set_fat(0.0));
        assert!(!ingredient.set_carbohydrates(-1.0));
        assert!(!ingredient.set_protein(0.0));
        assert!(!ingredient.set_calories(-5.0));
        assert_eq!(ingredient, before);
    }

    #[test]
    fn test_set_category_replaces_id_and_category() {
        let mut ingredient = tuna();
        let other = category(CategoryKind::Ingredient);
        assert!(ingredient.set_category(Some(other.clone())));
        assert_eq!(ingredient.category_id(), other.id());
        assert_eq!(ingredient.category(), &other);
    }

    #[test]
    fn test_set_category_none_is_noop() {
        let mut ingredient = tuna();
        let before = ingredient.category().clone();
        assert!(!ingredient.set_category(None));
        assert_eq!(ingredient.category(), &before);
    }

    #[test]
    fn test_set_category_skips_kind_check() {
        let mut ingredient = tuna();
        let recipe_category = category(CategoryKind::Recipe);
        assert!(ingredient.set_category(Some(recipe_category.clone())));
        assert_eq!(ingredient.category().kind(), CategoryKind::Recipe);
    }
}

//! Shared nutrition data structure
//!
//! Used by ingredients (per 100 g), recipes (totals) and resolved daily intake entries.

use serde::{Deserialize, Serialize};

/// Grams are converted to a share of the per-100 g nutrient values
pub const PER_GRAM: f64 = 0.01;

/// Nutritional information
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub fat: f64,           // grams
    pub carbohydrates: f64, // grams
    pub protein: f64,       // grams
    pub calories: f64,      // kcal
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            fat: self.fat * multiplier,
            carbohydrates: self.carbohydrates * multiplier,
            protein: self.protein * multiplier,
            calories: self.calories * multiplier,
        }
    }

    /// Nutrients contained in `grams` of something described per 100 g
    pub fn for_grams(&self, grams: f64) -> Self {
        self.scale(grams * PER_GRAM)
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition {
            fat: self.fat + other.fat,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            protein: self.protein + other.protein,
            calories: self.calories + other.calories,
        }
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

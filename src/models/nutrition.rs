//! Shared nutrition data structure
//!
//! Used by dishes (per 100 g), logged meals and daily totals.

use serde::{de, Deserialize, Deserializer, Serialize};

/// Macronutrient values. Dishes store them per 100 grams; meal and day
/// figures are the scaled amounts actually eaten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub fat: f64,     // grams
    pub carbs: f64,   // grams
    pub fiber: f64,   // grams
}

/// Upper bound for any per-100g value; keeps scaled portions and daily sums finite
pub const MAX_PER_100G: f64 = 10_000.0;

/// Round to one decimal place, half away from zero
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ratio applied to per-100g values for a portion of `weight_g` grams
fn portion_ratio(weight_g: f64) -> f64 {
    weight_g / 100.0
}

/// Accept either a JSON number or a string holding one (`"12.5"`)
pub(crate) fn deserialize_number_like<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Number(f64),
        Text(String),
    }

    match NumberLike::deserialize(deserializer)? {
        NumberLike::Number(n) => Ok(n),
        NumberLike::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {:?}", s))),
    }
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbs: self.carbs * multiplier,
            fiber: self.fiber * multiplier,
        }
    }

    /// Per-100g values scaled to a portion of `weight_g` grams
    pub fn for_portion(&self, weight_g: f64) -> Self {
        self.scale(portion_ratio(weight_g))
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
            fiber: self.fiber + other.fiber,
        }
    }

    /// Every field rounded to one decimal place
    pub fn rounded(&self) -> Self {
        Self {
            calories: round1(self.calories),
            protein: round1(self.protein),
            fat: round1(self.fat),
            carbs: round1(self.carbs),
            fiber: round1(self.fiber),
        }
    }

    /// Name of the first field that is negative, not a finite number, or
    /// above [`MAX_PER_100G`]
    pub fn first_invalid_field(&self) -> Option<&'static str> {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
            ("fiber", self.fiber),
        ]
        .into_iter()
        .find(|(_, v)| !(0.0..=MAX_PER_100G).contains(v))
        .map(|(name, _)| name)
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

//! Daily stats aggregation
//!
//! Per-meal figures are rounded for display, but totals are summed from the
//! unrounded values and rounded once at the end.

use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::models::{Meal, Nutrition};

use super::{parse_date, ServiceResult};

/// One meal's line in the daily report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealLine {
    pub id: i64,
    pub name: String,
    pub weight: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
}

impl From<&Meal> for MealLine {
    fn from(meal: &Meal) -> Self {
        let eaten = meal.nutrition().rounded();
        Self {
            id: meal.id,
            name: meal.dish.name.clone(),
            weight: meal.weight_g,
            calories: eaten.calories,
            protein: eaten.protein,
            fat: eaten.fat,
            carbs: eaten.carbs,
            fiber: eaten.fiber,
        }
    }
}

/// Totals and meal lines for one user and one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    /// The requested date, exactly as given
    pub date: String,
    pub totals: Nutrition,
    pub meals: Vec<MealLine>,
}

/// Build the report for `meals`, which must already be the day's meals in order
pub fn aggregate(date: String, meals: &[Meal]) -> DailyStats {
    let totals: Nutrition = meals.iter().map(Meal::nutrition).sum();

    DailyStats {
        date,
        totals: totals.rounded(),
        meals: meals.iter().map(MealLine::from).collect(),
    }
}

/// Daily totals for `user_id` on `date` (`YYYY-MM-DD`)
pub fn daily_stats(db: &Database, user_id: i64, date: &str) -> ServiceResult<DailyStats> {
    let day = parse_date(date)?;
    let meals = db.with_conn(|conn| Meal::list_for_day(conn, user_id, day))?;

    let stats = aggregate(date.to_string(), &meals);
    debug!(
        user_id,
        date = %day,
        meals = stats.meals.len(),
        calories = stats.totals.calories,
        "Aggregated daily stats"
    );
    Ok(stats)
}

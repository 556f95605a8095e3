//! Meal log operations

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::models::{deserialize_number_like, Dish, Meal, MealCreate};

use super::{parse_date, ServiceError, ServiceResult};

/// Heaviest single portion accepted, in grams
pub const MAX_WEIGHT_G: f64 = 100_000.0;

/// Body of a meal log request
#[derive(Debug, Clone, Deserialize)]
pub struct LogMealRequest {
    pub dish_id: i64,
    #[serde(deserialize_with = "deserialize_number_like")]
    pub weight_g: f64,
    /// Calendar date the meal belongs to; today when absent
    #[serde(default)]
    pub date: Option<String>,
}

/// Log a meal for `user_id` using the local clock
pub fn log_meal(db: &Database, user_id: i64, request: LogMealRequest) -> ServiceResult<Meal> {
    log_meal_at(db, user_id, request, Local::now().naive_local())
}

/// Log a meal as if the current local time were `now`.
///
/// The timestamp is the requested date (or `now`'s date) combined with
/// `now`'s time of day.
pub fn log_meal_at(
    db: &Database,
    user_id: i64,
    request: LogMealRequest,
    now: NaiveDateTime,
) -> ServiceResult<Meal> {
    if !(request.weight_g > 0.0 && request.weight_g <= MAX_WEIGHT_G) {
        return Err(ServiceError::Validation(format!(
            "weight_g must be a positive number no greater than {}",
            MAX_WEIGHT_G
        )));
    }

    let date = match request.date.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value)?,
        _ => now.date(),
    };
    let timestamp = date.and_time(now.time());

    let meal = db.with_transaction(|tx| {
        if Dish::get_by_id(tx, request.dish_id)?.is_none() {
            return Ok(None);
        }

        let meal = Meal::create(
            tx,
            &MealCreate {
                user_id,
                dish_id: request.dish_id,
                weight_g: request.weight_g,
                timestamp,
            },
        )?;
        Ok(Some(meal))
    })?;

    let meal = meal.ok_or_else(|| {
        ServiceError::NotFound(format!("Dish not found with id: {}", request.dish_id))
    })?;

    info!(
        user_id,
        meal_id = meal.id,
        dish_id = meal.dish.id,
        weight_g = meal.weight_g,
        "Logged meal"
    );
    Ok(meal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DishCreate;
    use crate::services::dishes::create_dish;
    use crate::services::test_support::{temp_db, user};

    fn request(dish_id: i64, weight_g: f64, date: Option<&str>) -> LogMealRequest {
        LogMealRequest {
            dish_id,
            weight_g,
            date: date.map(str::to_string),
        }
    }

    fn noon_jan_5() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-05 12:34:56", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn setup() -> (tempfile::TempDir, Database, i64, i64) {
        let (dir, db) = temp_db();
        let user_id = user(&db, "alice");
        let dish_id = create_dish(
            &db,
            DishCreate {
                name: "Buckwheat".to_string(),
                calories: 343.0,
                protein: 13.3,
                fat: 3.4,
                carbs: 71.5,
                fiber: 10.0,
            },
        )
        .unwrap()
        .id;
        (dir, db, user_id, dish_id)
    }

    #[test]
    fn test_date_combines_with_current_time() {
        let (_dir, db, user_id, dish_id) = setup();

        let meal = log_meal_at(&db, user_id, request(dish_id, 150.0, Some("2024-01-01")), noon_jan_5())
            .unwrap();
        assert_eq!(meal.timestamp, "2024-01-01T12:34:56.000000");
        assert_eq!(meal.user_id, user_id);
        assert_eq!(meal.dish.name, "Buckwheat");
    }

    #[test]
    fn test_missing_date_defaults_to_today() {
        let (_dir, db, user_id, dish_id) = setup();

        let meal = log_meal_at(&db, user_id, request(dish_id, 80.0, None), noon_jan_5()).unwrap();
        assert_eq!(meal.timestamp, "2024-01-05T12:34:56.000000");

        let meal = log_meal_at(&db, user_id, request(dish_id, 80.0, Some("")), noon_jan_5()).unwrap();
        assert!(meal.timestamp.starts_with("2024-01-05T"));
    }

    #[test]
    fn test_rejects_bad_input() {
        let (_dir, db, user_id, dish_id) = setup();

        for weight in [0.0, -10.0, f64::NAN, f64::INFINITY, 1e10] {
            let err = log_meal_at(&db, user_id, request(dish_id, weight, None), noon_jan_5()).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let err = log_meal_at(&db, user_id, request(dish_id, 50.0, Some("yesterday")), noon_jan_5())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = log_meal_at(&db, user_id, request(dish_id + 100, 50.0, None), noon_jan_5()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_heaviest_portion_stays_finite() {
        let (_dir, db, user_id, _) = setup();
        let dense = create_dish(
            &db,
            DishCreate {
                name: "Lard".to_string(),
                calories: crate::models::MAX_PER_100G,
                protein: 0.0,
                fat: crate::models::MAX_PER_100G,
                carbs: 0.0,
                fiber: 0.0,
            },
        )
        .unwrap();

        let meal = log_meal_at(&db, user_id, request(dense.id, MAX_WEIGHT_G, None), noon_jan_5()).unwrap();
        let portion = meal.nutrition();
        assert!(portion.calories.is_finite());
        assert_eq!(portion.calories, 1e7);
    }

    #[test]
    fn test_request_accepts_string_weight() {
        let req: LogMealRequest =
            serde_json::from_str(r#"{"dish_id": 3, "weight_g": "120.5"}"#).unwrap();
        assert_eq!(req.weight_g, 120.5);
        assert_eq!(req.date, None);

        assert!(serde_json::from_str::<LogMealRequest>(r#"{"weight_g": 10}"#).is_err());
    }
}

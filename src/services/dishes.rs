//! Dish catalog operations

use tracing::{debug, info};

use crate::db::Database;
use crate::models::{Dish, DishCreate, MAX_PER_100G};

use super::{ServiceError, ServiceResult};

/// Add a new dish to the catalog
pub fn create_dish(db: &Database, data: DishCreate) -> ServiceResult<Dish> {
    if data.name.trim().is_empty() {
        return Err(ServiceError::Validation("Dish name cannot be empty".to_string()));
    }

    if let Some(field) = data.nutrition().first_invalid_field() {
        return Err(ServiceError::Validation(format!(
            "{} must be a number between 0 and {}",
            field, MAX_PER_100G
        )));
    }

    let dish = db.with_conn(|conn| Dish::create(conn, &data))?;
    info!(dish_id = dish.id, name = %dish.name, "Created dish");
    Ok(dish)
}

/// List the catalog, optionally filtered by a case-insensitive name substring
pub fn list_dishes(db: &Database, query: Option<&str>) -> ServiceResult<Vec<Dish>> {
    let dishes = db.with_conn(|conn| Dish::list(conn, query))?;
    debug!(query = ?query, count = dishes.len(), "Listed dishes");
    Ok(dishes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::temp_db;

    fn data(name: &str) -> DishCreate {
        DishCreate {
            name: name.to_string(),
            calories: 200.0,
            protein: 10.0,
            fat: 5.0,
            carbs: 30.0,
            fiber: 0.0,
        }
    }

    #[test]
    fn test_create_then_search() {
        let (_dir, db) = temp_db();
        let dish = create_dish(&db, data("Greek Yogurt")).unwrap();

        let hits = list_dishes(&db, Some("yog")).unwrap();
        assert_eq!(hits, vec![dish]);
        assert!(list_dishes(&db, Some("cheese")).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_blank_name_and_out_of_range_macros() {
        let (_dir, db) = temp_db();

        let err = create_dish(&db, data("   ")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut negative = data("Soup");
        negative.protein = -0.5;
        match create_dish(&db, negative).unwrap_err() {
            ServiceError::Validation(msg) => assert!(msg.contains("protein")),
            other => panic!("unexpected error: {:?}", other),
        }

        let mut infinite = data("Soup");
        infinite.calories = f64::INFINITY;
        assert!(matches!(create_dish(&db, infinite), Err(ServiceError::Validation(_))));

        let mut huge = data("Soup");
        huge.calories = 1e308;
        assert!(matches!(create_dish(&db, huge), Err(ServiceError::Validation(_))));

        assert!(list_dishes(&db, None).unwrap().is_empty());
    }
}

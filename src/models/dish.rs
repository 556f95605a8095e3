//! Dish model
//!
//! A catalog entry with macronutrients per 100 grams.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::nutrition::{deserialize_number_like, Nutrition};

/// A dish with nutritional information per 100 g
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(skip)]
    pub created_at: String,
}

/// Data for creating a new dish
#[derive(Debug, Clone, Deserialize)]
pub struct DishCreate {
    pub name: String,
    #[serde(deserialize_with = "deserialize_number_like")]
    pub calories: f64,
    #[serde(deserialize_with = "deserialize_number_like")]
    pub protein: f64,
    #[serde(deserialize_with = "deserialize_number_like")]
    pub fat: f64,
    #[serde(deserialize_with = "deserialize_number_like")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "deserialize_number_like")]
    pub fiber: f64,
}

impl DishCreate {
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            fat: self.fat,
            carbs: self.carbs,
            fiber: self.fiber,
        }
    }
}

impl Dish {
    /// Create a Dish from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            nutrition: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                fat: row.get("fat")?,
                carbs: row.get("carbs")?,
                fiber: row.get("fiber")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new dish into the database
    pub fn create(conn: &Connection, data: &DishCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO dishes (name, calories, protein, fat, carbs, fiber)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.name.trim(),
                data.calories,
                data.protein,
                data.fat,
                data.carbs,
                data.fiber,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::MissingRow { table: "dishes", id })
    }

    /// Get a dish by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(dish) => Ok(Some(dish)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List dishes in insertion order, optionally keeping only those whose
    /// name contains `query` regardless of case. The query is matched as
    /// given, whitespace included; only an empty query returns everything.
    ///
    /// Matching happens here rather than in SQL because SQLite's LIKE only
    /// folds ASCII letters.
    pub fn list(conn: &Connection, query: Option<&str>) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes ORDER BY id ASC")?;
        let dishes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let needle = match query {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return Ok(dishes),
        };

        Ok(dishes
            .into_iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Count all dishes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM dishes", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create(conn: &Connection, name: &str, calories: f64) -> Dish {
        Dish::create(
            conn,
            &DishCreate {
                name: name.to_string(),
                calories,
                protein: 1.0,
                fat: 2.0,
                carbs: 3.0,
                fiber: 0.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let conn = conn();
        let dish = create(&conn, "  Oatmeal ", 370.0);

        assert_eq!(dish.name, "Oatmeal");
        assert_eq!(dish.nutrition.calories, 370.0);
        assert_eq!(Dish::get_by_id(&conn, dish.id).unwrap(), Some(dish));
        assert_eq!(Dish::get_by_id(&conn, 9999).unwrap(), None);
    }

    #[test]
    fn test_list_filters_case_insensitively() {
        let conn = conn();
        create(&conn, "Chicken Breast", 165.0);
        create(&conn, "Rice", 130.0);
        create(&conn, "Гречка", 343.0);

        let all = Dish::list(&conn, None).unwrap();
        assert_eq!(
            all.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["Chicken Breast", "Rice", "Гречка"]
        );

        let hits = Dish::list(&conn, Some("BREAST")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Chicken Breast");

        let hits = Dish::list(&conn, Some("греч")).unwrap();
        assert_eq!(hits.len(), 1);

        assert!(Dish::list(&conn, Some("pasta")).unwrap().is_empty());
        assert_eq!(Dish::list(&conn, Some("")).unwrap().len(), 3);
    }

    #[test]
    fn test_list_keeps_whitespace_in_query() {
        let conn = conn();
        create(&conn, "Chicken Breast", 165.0);
        create(&conn, "Rice", 130.0);

        assert!(Dish::list(&conn, Some("   ")).unwrap().is_empty());

        let hits = Dish::list(&conn, Some(" breast")).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(Dish::list(&conn, Some(" rice")).unwrap().is_empty());
    }

    #[test]
    fn test_create_payload_accepts_numeric_strings() {
        let data: DishCreate = serde_json::from_str(
            r#"{"name": "Apple", "calories": "52", "protein": 0.3, "fat": "0.2", "carbs": 14}"#,
        )
        .unwrap();
        assert_eq!(data.calories, 52.0);
        assert_eq!(data.fat, 0.2);
        assert_eq!(data.fiber, 0.0);

        let bad = serde_json::from_str::<DishCreate>(
            r#"{"name": "Apple", "calories": "lots", "protein": 0, "fat": 0, "carbs": 0}"#,
        );
        assert!(bad.is_err());

        let missing = serde_json::from_str::<DishCreate>(r#"{"name": "Apple", "calories": 52}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_serializes_flat() {
        let conn = conn();
        let dish = create(&conn, "Rice", 130.0);
        let json = serde_json::to_value(&dish).unwrap();

        assert_eq!(json["id"], dish.id);
        assert_eq!(json["calories"], 130.0);
        assert_eq!(json["fiber"], 0.0);
        assert!(json.get("nutrition").is_none());
        assert!(json.get("created_at").is_none());
    }
}

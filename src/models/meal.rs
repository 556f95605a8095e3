//! Meal model
//!
//! A logged portion of a dish, owned by a user.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::{DbError, DbResult};
use super::{Dish, Nutrition};

/// Storage format of `meals.timestamp`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Storage and wire format of calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A meal with its dish embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meal {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub dish: Dish,
    pub weight_g: f64,
    pub timestamp: String,
}

/// Data for logging a meal
#[derive(Debug, Clone)]
pub struct MealCreate {
    pub user_id: i64,
    pub dish_id: i64,
    pub weight_g: f64,
    pub timestamp: NaiveDateTime,
}

impl Meal {
    /// Macros actually eaten, unrounded
    pub fn nutrition(&self) -> Nutrition {
        self.dish.nutrition.for_portion(self.weight_g)
    }

    /// Create from a `meals JOIN dishes` row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("meal_id")?,
            user_id: row.get("user_id")?,
            dish: Dish {
                id: row.get("dish_id")?,
                name: row.get("name")?,
                nutrition: Nutrition {
                    calories: row.get("calories")?,
                    protein: row.get("protein")?,
                    fat: row.get("fat")?,
                    carbs: row.get("carbs")?,
                    fiber: row.get("fiber")?,
                },
                created_at: row.get("created_at")?,
            },
            weight_g: row.get("weight_g")?,
            timestamp: row.get("timestamp")?,
        })
    }

    /// Insert a new meal. The dish must exist; the foreign key rejects it otherwise.
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (user_id, dish_id, weight_g, timestamp, eaten_on)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.user_id,
                data.dish_id,
                data.weight_g,
                data.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                data.timestamp.date().format(DATE_FORMAT).to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::MissingRow { table: "meals", id })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT m.id AS meal_id, m.user_id, m.dish_id, m.weight_g, m.timestamp,
                   d.name, d.calories, d.protein, d.fat, d.carbs, d.fiber, d.created_at
            FROM meals m
            INNER JOIN dishes d ON d.id = m.dish_id
            WHERE m.id = ?1
            "#,
        )?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All of a user's meals eaten on `date`, in the order they were logged
    pub fn list_for_day(conn: &Connection, user_id: i64, date: NaiveDate) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT m.id AS meal_id, m.user_id, m.dish_id, m.weight_g, m.timestamp,
                   d.name, d.calories, d.protein, d.fat, d.carbs, d.fiber, d.created_at
            FROM meals m
            INNER JOIN dishes d ON d.id = m.dish_id
            WHERE m.user_id = ?1 AND m.eaten_on = ?2
            ORDER BY m.id ASC
            "#,
        )?;

        let meals = stmt
            .query_map(
                params![user_id, date.format(DATE_FORMAT).to_string()],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }
}

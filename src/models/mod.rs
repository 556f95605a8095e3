//! Data models
//!
//! Rust structs representing database entities.

mod dish;
mod meal;
mod nutrition;
mod session;
mod user;

pub use dish::{Dish, DishCreate};
pub use meal::{Meal, MealCreate, DATE_FORMAT, TIMESTAMP_FORMAT};
pub use nutrition::{Nutrition, MAX_PER_100G};
pub use session::Session;
pub use user::User;

pub(crate) use nutrition::deserialize_number_like;

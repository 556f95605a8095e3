//! Food Tracker Library
//!
//! Dish catalog, meal logging and per-day macro totals, served over HTTP.

pub mod build_info;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod services;

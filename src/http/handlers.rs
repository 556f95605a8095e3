//! Route handlers
//!
//! Thin adapters: extract, call the matching operation in
//! [`crate::services`], wrap the result.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;
use serde::Deserialize;

use crate::models::{Dish, DishCreate, Meal, DATE_FORMAT};
use crate::services::accounts::{self, AccountSummary, Credentials};
use crate::services::meals::{self, LogMealRequest};
use crate::services::stats::{self, DailyStats};
use crate::services::status::ServiceStatus;
use crate::services::{dishes, ServiceResult};

use super::session::{clear_session_cookie, cookie_value, session_cookie, CurrentUser, SESSION_COOKIE};
use super::AppState;

// ============================================================================
// Dishes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DishQuery {
    /// Case-insensitive name substring
    pub q: Option<String>,
}

/// `GET /api/dishes?q=<substring>`
pub async fn list_dishes(
    State(state): State<AppState>,
    _user: CurrentUser,
    query: Result<Query<DishQuery>, QueryRejection>,
) -> ServiceResult<Json<Vec<Dish>>> {
    let Query(query) = query?;
    let dishes = dishes::list_dishes(&state.database, query.q.as_deref())?;
    Ok(Json(dishes))
}

/// `POST /api/dishes`
pub async fn create_dish(
    State(state): State<AppState>,
    _user: CurrentUser,
    payload: Result<Json<DishCreate>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Dish>)> {
    let Json(data) = payload?;
    let dish = dishes::create_dish(&state.database, data)?;
    Ok((StatusCode::CREATED, Json(dish)))
}

// ============================================================================
// Meals and stats
// ============================================================================

/// `POST /api/meals`
pub async fn log_meal(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<LogMealRequest>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Meal>)> {
    let Json(request) = payload?;
    let meal = meals::log_meal(&state.database, user.user_id, request)?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// `YYYY-MM-DD`; today when absent or empty
    pub date: Option<String>,
}

/// `GET /api/stats?date=YYYY-MM-DD`
pub async fn daily_stats(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ServiceResult<Json<DailyStats>> {
    let Query(query) = query?;
    let date = match query.date {
        Some(date) if !date.trim().is_empty() => date,
        _ => Local::now().date_naive().format(DATE_FORMAT).to_string(),
    };

    let stats = stats::daily_stats(&state.database, user.user_id, &date)?;
    Ok(Json(stats))
}

// ============================================================================
// Accounts
// ============================================================================

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<AccountSummary>)> {
    let Json(credentials) = payload?;
    let account = accounts::register(&state.database, credentials, state.bcrypt_cost).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// `POST /auth/login`; sets the session cookie
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Json(credentials) = payload?;
    let (account, session) = accounts::login(&state.database, credentials, state.session_ttl).await?;

    let cookie = session_cookie(&session.token, state.session_ttl.num_seconds());
    Ok(([(SET_COOKIE, cookie)], Json(account)))
}

/// `POST /auth/logout`; clears the session cookie
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ServiceResult<impl IntoResponse> {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        accounts::logout(&state.database, token)?;
    }
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, clear_session_cookie())]))
}

// ============================================================================
// Status
// ============================================================================

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> ServiceResult<Json<ServiceStatus>> {
    let status = state.status.get_status(&state.database)?;
    Ok(Json(status))
}

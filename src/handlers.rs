use crate::calendar::month_view;
use crate::errors::AppError;
use crate::models::{
    normalize_email, CalendarQuery, CreateHabitRequest, DashboardStats, HabitId, HabitResponse,
    HabitView, HabitsResponse, LoginRequest, MessageResponse, MonthView, NewHabit, NewUser,
    SignupRequest, TrackRequest, TrackResponse, User, UserResponse,
};
use crate::password::{hash_password, verify_password};
use crate::session::{token_from_headers, CurrentUser};
use crate::state::AppState;
use crate::stats::build_dashboard_at;
use crate::streak::streaks;
use crate::tracked::checked_date;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Datelike;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(payload) = payload?;
    let new_user = NewUser::from_request(payload)?;

    // Checked again under the store lock; this one skips hashing for known emails.
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::bad_request("An account with this email already exists"));
    }

    let password = new_user.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    let record = state
        .users
        .create_user(&new_user.email, &new_user.name, &password_hash)
        .await?;

    info!(user_id = %record.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: User::from(&record),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    let Some(record) = state.users.find_by_email(&email).await? else {
        warn!("login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let password = payload.password;
    let stored_hash = record.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;
    if !valid {
        warn!(user_id = %record.id, "login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.create(record.id).await;
    info!(user_id = %record.id, "user logged in");
    Ok((
        [(header::SET_COOKIE, state.sessions.set_cookie(&token))],
        Json(UserResponse {
            user: User::from(&record),
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    )
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let record = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(UserResponse {
        user: User::from(&record),
    }))
}

pub async fn list_habits(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<HabitsResponse>, AppError> {
    let today = state.today();
    let habits = state
        .habits
        .list_habits(user_id)
        .await?
        .into_iter()
        .map(|habit| {
            let result = streaks(&habit.tracked_dates, today);
            HabitView::new(habit, result)
        })
        .collect();

    Ok(Json(HabitsResponse { habits }))
}

pub async fn create_habit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<CreateHabitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HabitResponse>), AppError> {
    let Json(payload) = payload?;
    let new_habit = NewHabit::parse(payload.name.as_deref(), payload.color.as_deref())?;
    let habit = state.habits.create_habit(user_id, new_habit).await?;

    info!(user_id = %user_id, habit_id = %habit.id, "created habit");
    Ok((StatusCode::CREATED, Json(HabitResponse { habit })))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(habit_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let habit_id = parse_habit_id(&habit_id)?;
    state.habits.delete_habit(user_id, habit_id).await?;

    info!(user_id = %user_id, habit_id = %habit_id, "deleted habit");
    Ok(Json(MessageResponse {
        message: "Habit deleted successfully".into(),
    }))
}

/// Toggles one day on a habit. Malformed and future days are refused before
/// the store is touched.
pub async fn track_habit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let Json(payload) = payload?;
    let habit_id = payload
        .habit_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Habit ID is required"))?;
    let key = payload
        .date
        .filter(|date| !date.is_empty())
        .ok_or_else(|| AppError::bad_request("Date is required"))?;

    let date = checked_date(&key, state.today())?;
    let habit_id = parse_habit_id(&habit_id)?;
    let (habit, is_tracked) = state
        .habits
        .toggle_tracked_date(user_id, habit_id, date)
        .await?;

    info!(user_id = %user_id, habit_id = %habit_id, date = %key, is_tracked, "toggled tracked date");
    Ok(Json(TrackResponse { habit, is_tracked }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<DashboardStats>, AppError> {
    let habits = state.habits.list_habits(user_id).await?;
    Ok(Json(build_dashboard_at(state.today(), &habits)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<MonthView>, AppError> {
    let Query(query) = query?;
    let today = state.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let habits = state.habits.list_habits(user_id).await?;
    Ok(Json(month_view(year, month, &habits, today)?))
}

/// Ids that cannot exist are reported the same way as habits that do not.
fn parse_habit_id(raw: &str) -> Result<HabitId, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::habit_not_found())
}

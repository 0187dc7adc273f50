use crate::errors::AppError;
use crate::streak::HabitStreaks;
use crate::tracked::TrackedDates;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub type UserId = Uuid;
pub type HabitId = Uuid;

pub const DEFAULT_HABIT_COLOR: &str = "#3b82f6";
pub const MAX_HABIT_NAME_CHARS: usize = 100;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color pattern is valid")
});

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub tracked_dates: TrackedDates,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new habit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub color: String,
}

impl NewHabit {
    pub fn parse(name: Option<&str>, color: Option<&str>) -> Result<Self, AppError> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(AppError::bad_request("Habit name is required"));
        }
        if name.chars().count() > MAX_HABIT_NAME_CHARS {
            return Err(AppError::bad_request(
                "Habit name cannot exceed 100 characters",
            ));
        }

        let color = match color {
            Some(color) if !color.is_empty() => color,
            _ => DEFAULT_HABIT_COLOR,
        };
        if !HEX_COLOR.is_match(color) {
            return Err(AppError::bad_request(
                "Invalid color format. Please use hex color (e.g., #3b82f6)",
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            color: color.to_owned(),
        })
    }
}

/// A stored account. The password is only ever held as an Argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            name: record.name.clone(),
        }
    }
}

/// Signup input after trimming and email normalisation.
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_SHAPE, message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl NewUser {
    pub fn from_request(request: SignupRequest) -> Result<Self, AppError> {
        let user = Self {
            name: request.name.trim().to_owned(),
            email: normalize_email(&request.email),
            password: request.password,
        };
        user.validate()?;
        Ok(user)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub habit_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl HabitView {
    pub fn new(habit: Habit, streaks: HabitStreaks) -> Self {
        Self {
            habit,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitsResponse {
    pub habits: Vec<HabitView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitResponse {
    pub habit: Habit,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub habit: Habit,
    pub is_tracked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStreakPoint {
    pub habit_id: HabitId,
    pub name: String,
    pub color: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCompletionPoint {
    pub date: String,
    pub completed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub date: String,
    pub total_habits: usize,
    pub total_tracked_days: usize,
    pub today_completed: usize,
    pub completion_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub habit_streaks: Vec<HabitStreakPoint>,
    pub last_7_days: Vec<DailyCompletionPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub is_future: bool,
    pub tracked: Vec<HabitId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub previous: MonthRef,
    pub next: MonthRef,
    pub days: Vec<CalendarDay>,
}

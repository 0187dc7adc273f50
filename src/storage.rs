use crate::models::{Habit, HabitId, NewHabit, UserId, UserRecord};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("habit not found")]
    HabitNotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("data file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("data file is not valid: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence for habits, always scoped to the owning user.
///
/// A habit owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Newest habits first.
    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, StoreError>;

    async fn create_habit(&self, user_id: UserId, habit: NewHabit) -> Result<Habit, StoreError>;

    async fn delete_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<(), StoreError>;

    /// Flips `date` in the habit's tracked set and reports whether it was added.
    async fn toggle_tracked_date(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<(Habit, bool), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// `email` must already be normalised.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

/// JSON document store. Every write rewrites the whole file while holding the
/// lock, so concurrent toggles on one habit resolve as last write wins.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let data = load_data(&path).await?;
        info!(
            path = %path.display(),
            users = data.users.len(),
            habits = data.habits.len(),
            "opened habit store"
        );

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Flushes the current state one last time.
    pub async fn close(&self) -> Result<(), StoreError> {
        let data = self.data.lock().await;
        persist_data(&self.path, &data).await?;
        info!(path = %self.path.display(), "closed habit store");
        Ok(())
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        persist_data(&self.path, data).await.inspect_err(|err| {
            error!(path = %self.path.display(), error = %err, "failed to write data file");
        })
    }
}

pub async fn load_data(path: &Path) -> Result<StoreData, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
        Err(err) => Err(err.into()),
    }
}

/// Writes to a sibling temp file and renames it over the data file.
pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn owned_position(data: &StoreData, user_id: UserId, habit_id: HabitId) -> Option<usize> {
    data.habits
        .iter()
        .position(|habit| habit.id == habit_id && habit.user_id == user_id)
}

#[async_trait]
impl HabitStore for FileStore {
    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, StoreError> {
        let data = self.data.lock().await;
        let mut habits: Vec<Habit> = data
            .habits
            .iter()
            .filter(|habit| habit.user_id == user_id)
            .cloned()
            .collect();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(habits)
    }

    async fn create_habit(&self, user_id: UserId, habit: NewHabit) -> Result<Habit, StoreError> {
        let habit = Habit {
            id: Uuid::new_v4(),
            user_id,
            name: habit.name,
            color: habit.color,
            tracked_dates: Default::default(),
            created_at: Utc::now(),
        };

        let mut data = self.data.lock().await;
        data.habits.push(habit.clone());
        if let Err(err) = self.persist(&data).await {
            data.habits.pop();
            return Err(err);
        }
        Ok(habit)
    }

    async fn delete_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let index = owned_position(&data, user_id, habit_id).ok_or(StoreError::HabitNotFound)?;

        let removed = data.habits.remove(index);
        if let Err(err) = self.persist(&data).await {
            data.habits.insert(index, removed);
            return Err(err);
        }
        Ok(())
    }

    async fn toggle_tracked_date(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<(Habit, bool), StoreError> {
        let mut data = self.data.lock().await;
        let index = owned_position(&data, user_id, habit_id).ok_or(StoreError::HabitNotFound)?;

        let added = data.habits[index].tracked_dates.toggle_in_place(date);
        if let Err(err) = self.persist(&data).await {
            data.habits[index].tracked_dates.toggle_in_place(date);
            return Err(err);
        }
        Ok((data.habits[index].clone(), added))
    }
}

#[async_trait]
impl UserStore for FileStore {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut data = self.data.lock().await;
        if data.users.iter().any(|user| user.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        data.users.push(user.clone());
        if let Err(err) = self.persist(&data).await {
            data.users.pop();
            return Err(err);
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|user| user.id == user_id).cloned())
    }
}

use crate::date_key;
use crate::session::SessionStore;
use crate::storage::{HabitStore, UserStore};
use chrono::NaiveDate;
use std::sync::Arc;

/// Source of "today". Handlers sample it per request.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    Local,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::Local => date_key::today(),
            Self::Fixed(date) => *date,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub habits: Arc<dyn HabitStore>,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionStore,
    pub clock: Clock,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, sessions: SessionStore) -> Self
    where
        S: HabitStore + UserStore + 'static,
    {
        Self {
            habits: store.clone(),
            users: store,
            sessions,
            clock: Clock::Local,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

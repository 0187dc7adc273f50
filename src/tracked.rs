use crate::date_key::{self, DateKeyError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    #[error(transparent)]
    InvalidDate(#[from] DateKeyError),
    #[error("cannot track {0}, the day has not happened yet")]
    FutureDate(String),
}

/// The set of days a habit was completed on.
///
/// Membership is by calendar day, so a day can only be present once. The
/// iteration order is ascending but callers that display dates should not
/// rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedDates(BTreeSet<NaiveDate>);

impl TrackedDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    /// Removes `date` if present, adds it otherwise. Returns whether it was added.
    pub fn toggle_in_place(&mut self, date: NaiveDate) -> bool {
        if self.0.remove(&date) {
            false
        } else {
            self.0.insert(date);
            true
        }
    }

    pub fn toggle(&self, date: NaiveDate) -> (Self, bool) {
        let mut next = self.clone();
        let added = next.toggle_in_place(date);
        (next, added)
    }

    /// Toggles a raw date key, refusing malformed keys and days after `today`.
    pub fn toggle_checked(&self, key: &str, today: NaiveDate) -> Result<(Self, bool), TrackError> {
        let date = checked_date(key, today)?;
        Ok(self.toggle(date))
    }
}

/// Decodes a key that is allowed to be toggled as of `today`.
pub fn checked_date(key: &str, today: NaiveDate) -> Result<NaiveDate, TrackError> {
    let date = date_key::decode(key)?;
    if date_key::is_future(date, today) {
        return Err(TrackError::FutureDate(key.to_owned()));
    }
    Ok(date)
}

impl FromIterator<NaiveDate> for TrackedDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for TrackedDates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|date| date_key::encode(*date)))
    }
}

impl<'de> Deserialize<'de> for TrackedDates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<String>::deserialize(deserializer)?;
        keys.iter()
            .map(|key| date_key::decode(key).map_err(serde::de::Error::custom))
            .collect()
    }
}

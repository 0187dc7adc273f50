//! Streak calculation over a habit's tracked days.
//!
//! Every surface that shows a streak goes through these functions; they are
//! pure over `(tracked days, today)` so they can be re-run whenever the clock
//! is re-sampled.

use crate::tracked::TrackedDates;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HabitStreaks {
    pub current: u32,
    pub longest: u32,
}

pub fn streaks(tracked: &TrackedDates, today: NaiveDate) -> HabitStreaks {
    HabitStreaks {
        current: current_streak(tracked, today),
        longest: longest_streak(tracked),
    }
}

/// Consecutive tracked days ending today, or ending yesterday when today has
/// not been tracked yet. Days after `today` are ignored.
pub fn current_streak(tracked: &TrackedDates, today: NaiveDate) -> u32 {
    let is_tracked = |date: NaiveDate| date <= today && tracked.contains(date);

    let start = if is_tracked(today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    let mut cursor = start;
    while let Some(date) = cursor {
        if !is_tracked(date) {
            break;
        }
        streak += 1;
        cursor = date.pred_opt();
    }
    streak
}

/// Longest run of consecutive calendar days anywhere in the history.
pub fn longest_streak(tracked: &TrackedDates) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in tracked.iter() {
        run = match previous {
            Some(prev) if (date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

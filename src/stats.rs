use crate::date_key::{self, encode};
use crate::models::{DailyCompletionPoint, DashboardStats, Habit, HabitStreakPoint};
use crate::streak::{current_streak, longest_streak, streaks};
use chrono::{Duration, NaiveDate};

pub fn today_completed(habits: &[Habit], today: NaiveDate) -> usize {
    habits
        .iter()
        .filter(|habit| habit.tracked_dates.contains(today))
        .count()
}

/// Share of habits done today as a whole percentage, 0 with no habits.
pub fn today_completion_rate(habits: &[Habit], today: NaiveDate) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let done = today_completed(habits, today) as f64;
    (done / habits.len() as f64 * 100.0).round() as u32
}

pub fn total_tracked_days(habits: &[Habit]) -> usize {
    habits.iter().map(|habit| habit.tracked_dates.len()).sum()
}

pub fn max_current_streak(habits: &[Habit], today: NaiveDate) -> u32 {
    habits
        .iter()
        .map(|habit| current_streak(&habit.tracked_dates, today))
        .max()
        .unwrap_or(0)
}

pub fn max_longest_streak(habits: &[Habit]) -> u32 {
    habits
        .iter()
        .map(|habit| longest_streak(&habit.tracked_dates))
        .max()
        .unwrap_or(0)
}

/// Dashboard for the local calendar day.
pub fn build_dashboard(habits: &[Habit]) -> DashboardStats {
    build_dashboard_at(date_key::today(), habits)
}

pub fn build_dashboard_at(today: NaiveDate, habits: &[Habit]) -> DashboardStats {
    let habit_streaks = habits
        .iter()
        .map(|habit| {
            let result = streaks(&habit.tracked_dates, today);
            HabitStreakPoint {
                habit_id: habit.id,
                name: habit.name.clone(),
                color: habit.color.clone(),
                current_streak: result.current,
                longest_streak: result.longest,
            }
        })
        .collect::<Vec<_>>();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        last_7_days.push(DailyCompletionPoint {
            date: encode(date),
            completed: today_completed(habits, date),
        });
    }

    DashboardStats {
        date: encode(today),
        total_habits: habits.len(),
        total_tracked_days: total_tracked_days(habits),
        today_completed: today_completed(habits, today),
        completion_rate: today_completion_rate(habits, today),
        current_streak: max_current_streak(habits, today),
        longest_streak: max_longest_streak(habits),
        habit_streaks,
        last_7_days,
    }
}

use crate::date_key::{encode, is_future};
use crate::models::{CalendarDay, Habit, MonthRef, MonthView};
use chrono::{Datelike, Duration, NaiveDate};

/// Six rows of seven days, Sunday first.
const GRID_CELLS: i64 = 42;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid month {year}-{month}, month must be between 1 and 12")]
    InvalidMonth { year: i32, month: u32 },
    #[error("month {year}-{month} is outside the supported calendar range")]
    OutOfRange { year: i32, month: u32 },
}

pub fn month_view(
    year: i32,
    month: u32,
    habits: &[Habit],
    today: NaiveDate,
) -> Result<MonthView, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    let out_of_range = CalendarError::OutOfRange { year, month };
    let start = first
        .checked_sub_signed(Duration::days(i64::from(first.weekday().num_days_from_sunday())))
        .ok_or(out_of_range.clone())?;

    let days = (0..GRID_CELLS)
        .map(|offset| {
            let date = start
                .checked_add_signed(Duration::days(offset))
                .ok_or(out_of_range.clone())?;
            Ok(CalendarDay {
                date: encode(date),
                day: date.day(),
                in_month: date.year() == year && date.month() == month,
                is_today: date == today,
                is_future: is_future(date, today),
                tracked: habits
                    .iter()
                    .filter(|habit| habit.tracked_dates.contains(date))
                    .map(|habit| habit.id)
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, CalendarError>>()?;

    Ok(MonthView {
        year,
        month,
        label: first.format("%B %Y").to_string(),
        previous: previous_month(year, month),
        next: next_month(year, month),
        days,
    })
}

fn previous_month(year: i32, month: u32) -> MonthRef {
    if month == 1 {
        MonthRef { year: year - 1, month: 12 }
    } else {
        MonthRef { year, month: month - 1 }
    }
}

fn next_month(year: i32, month: u32) -> MonthRef {
    if month == 12 {
        MonthRef { year: year + 1, month: 1 }
    } else {
        MonthRef { year, month: month + 1 }
    }
}

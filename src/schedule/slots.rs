//! Candidate slot generation over the business-hours window.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::SlotPolicy;
use crate::models::appointment::minute_of_day;

/// Ordered start times on `date` that fit a service of `duration_minutes`.
///
/// Empty for past dates. For today, slots before `now` rounded up to the
/// next grid boundary are dropped.
pub fn generate_slots(
    policy: &SlotPolicy,
    date: NaiveDate,
    duration_minutes: u32,
    now: NaiveDateTime,
) -> Vec<NaiveTime> {
    let today = now.date();
    if date < today || policy.slot_minutes == 0 {
        return Vec::new();
    }

    let step = policy.slot_minutes;
    let duration = duration_minutes.max(1);
    let open = minute_of_day(policy.open);
    let close = minute_of_day(policy.close);

    let earliest = if date == today {
        round_up_seconds(now.time().num_seconds_from_midnight(), step * 60)
    } else {
        0
    };

    let mut slots = Vec::new();
    let mut start = open;
    while start.saturating_add(duration) <= close {
        if start * 60 >= earliest
            && let Some(time) = NaiveTime::from_hms_opt(start / 60, start % 60, 0)
        {
            slots.push(time);
        }
        start = start.saturating_add(step);
    }
    slots
}

/// Whether `time` is a grid start inside business hours for the duration.
pub fn is_on_grid(policy: &SlotPolicy, time: NaiveTime, duration_minutes: u32) -> bool {
    let minute = minute_of_day(time);
    let open = minute_of_day(policy.open);
    let close = minute_of_day(policy.close);
    time.second() == 0
        && policy.slot_minutes > 0
        && minute >= open
        && (minute - open) % policy.slot_minutes == 0
        && minute.saturating_add(duration_minutes.max(1)) <= close
}

fn round_up_seconds(seconds: u32, step_seconds: u32) -> u32 {
    seconds.div_ceil(step_seconds) * step_seconds
}

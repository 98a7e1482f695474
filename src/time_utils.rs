// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling (all KMA times are KST, naive).

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// KMA mountain forecast announcement hours (KST).
const ANNOUNCEMENT_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

const KST_OFFSET_HOURS: i64 = 9;

/// Input format for the weather `datetime` query parameter.
pub const TARGET_HOUR_FORMAT: &str = "%Y-%m-%d %H";

/// Current wall-clock time in Korea, without zone.
pub fn now_kst() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(KST_OFFSET_HOURS)
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

/// Truncate to the start of the hour.
pub fn truncate_to_hour(dt: NaiveDateTime) -> NaiveDateTime {
    at_hour(dt.date(), dt.hour())
}

/// Parse `YYYY-MM-DD HH`, zero-padded and nothing else.
pub fn parse_target_hour(raw: &str) -> Option<NaiveDateTime> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 13
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    // chrono needs minutes to build a datetime.
    NaiveDateTime::parse_from_str(&format!("{raw}:00"), &format!("{TARGET_HOUR_FORMAT}:%M")).ok()
}

/// Latest KMA announcement at or before `target`.
///
/// Before 02:00 this is 23:00 of the previous day.
pub fn latest_kma_announcement(target: NaiveDateTime) -> NaiveDateTime {
    let hour = target.hour();
    match ANNOUNCEMENT_HOURS.iter().rev().find(|&&h| hour >= h) {
        Some(&h) => at_hour(target.date(), h),
        None => at_hour((target - Duration::days(1)).date(), 23),
    }
}

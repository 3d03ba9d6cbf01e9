// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eligibility gate: send window, daily cap, and per-number throttling.
//!
//! Each check is a pure function of the tenant policy, the stored state, and
//! an explicit `now`. The engine reads the state, runs the checks in order,
//! and writes the record only after a verified send.

use cabreview_core::types::{LastSentRecord, RejectReason, Schedule, TenantConfig};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

/// True when any enabled window row is open at `now`.
///
/// A tenant without enabled rows never sends.
pub fn within_send_window(schedules: &[Schedule], now: DateTime<Utc>) -> bool {
    schedules
        .iter()
        .filter(|schedule| schedule.enabled)
        .any(|schedule| is_open(schedule, now))
}

/// One row: `now` falls between start and end on an enabled weekday.
///
/// Start and end are `HH:MM` in the row's timezone (UTC when blank) and are
/// compared against the exact local instant, so an end of `17:30` closes at
/// `17:30:00`. Windows never cross midnight; an end before the start is
/// never open. Malformed times or an unknown timezone close the window.
fn is_open(schedule: &Schedule, now: DateTime<Utc>) -> bool {
    let tz = match schedule.time_zone.trim() {
        "" => Tz::UTC,
        name => match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(time_zone = name, "unknown schedule timezone");
                return false;
            }
        },
    };
    let (Some(start), Some(end)) = (parse_hhmm(&schedule.start), parse_hhmm(&schedule.end)) else {
        warn!(start = %schedule.start, end = %schedule.end, "malformed schedule window");
        return false;
    };

    let local = now.with_timezone(&tz);
    let day_enabled = match local.weekday() {
        Weekday::Mon => schedule.monday,
        Weekday::Tue => schedule.tuesday,
        Weekday::Wed => schedule.wednesday,
        Weekday::Thu => schedule.thursday,
        Weekday::Fri => schedule.friday,
        Weekday::Sat => schedule.saturday,
        Weekday::Sun => schedule.sunday,
    };
    let time = local.time();
    day_enabled && start <= time && time <= end
}

/// Strict `HH:MM`, two digits each.
fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    let well_formed = value.len() == 5
        && value.as_bytes()[2] == b':'
        && value
            .bytes()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// The tenant's throttle limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub min_send_frequency_days: u32,
    pub max_send_count: u32,
    pub max_daily_send_count: u32,
}

impl ThrottlePolicy {
    pub fn from_tenant(tenant: &TenantConfig) -> Self {
        Self {
            min_send_frequency_days: tenant.min_send_frequency_days,
            max_send_count: tenant.max_send_count,
            max_daily_send_count: tenant.max_daily_send_count,
        }
    }

    /// One more send today must stay within the client's daily cap.
    pub fn check_daily_cap(&self, sent_today: u32) -> Result<(), RejectReason> {
        if u64::from(sent_today) + 1 > u64::from(self.max_daily_send_count) {
            return Err(RejectReason::DailyCapReached);
        }
        Ok(())
    }

    /// Stop flag, minimum frequency, and lifetime count for one number.
    ///
    /// The count check is strict: a number may receive `max_send_count + 1`
    /// messages in total.
    pub fn check_record(
        &self,
        record: Option<&LastSentRecord>,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        let Some(record) = record else {
            return Ok(());
        };
        if record.stop {
            return Err(RejectReason::Stopped);
        }
        let min_gap = Duration::days(i64::from(self.min_send_frequency_days));
        if now.signed_duration_since(record.last_sent) < min_gap {
            return Err(RejectReason::SentTooRecently);
        }
        if record.sent_count > self.max_send_count {
            return Err(RejectReason::MaxSendCountReached);
        }
        Ok(())
    }
}

/// Count to store after a verified send.
pub fn next_sent_count(record: Option<&LastSentRecord>) -> u32 {
    record.map_or(0, |r| r.sent_count).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabreview_test_utils::fixtures::{always_open, utc};

    fn record(last_sent: &str, sent_count: u32, stop: bool) -> LastSentRecord {
        let last_sent = utc(last_sent);
        LastSentRecord {
            telephone: "447123456789".into(),
            client_id: 7,
            last_sent,
            last_sent_date: last_sent.date_naive(),
            sent_count,
            stop,
        }
    }

    const POLICY: ThrottlePolicy = ThrottlePolicy {
        min_send_frequency_days: 30,
        max_send_count: 2,
        max_daily_send_count: 1,
    };

    fn window(start: &str, end: &str) -> Schedule {
        Schedule {
            start: start.into(),
            end: end.into(),
            ..always_open()
        }
    }

    #[test]
    fn window_is_inclusive_up_to_the_exact_end() {
        let schedules = [window("09:00", "17:30")];
        // 2026-03-02 is a Monday.
        assert!(within_send_window(&schedules, utc("2026-03-02T09:00:00Z")));
        assert!(within_send_window(&schedules, utc("2026-03-02T17:30:00Z")));
        assert!(!within_send_window(&schedules, utc("2026-03-02T17:30:45Z")));
        assert!(!within_send_window(&schedules, utc("2026-03-02T08:59:59Z")));
    }

    #[test]
    fn window_uses_tenant_timezone() {
        let mut schedule = window("09:00", "17:00");
        schedule.time_zone = "Europe/London".into();
        let schedules = [schedule];
        // BST (UTC+1) in July: 08:30Z is 09:30 local.
        assert!(within_send_window(&schedules, utc("2026-07-06T08:30:00Z")));
        // 16:30Z is 17:30 local.
        assert!(!within_send_window(&schedules, utc("2026-07-06T16:30:00Z")));
    }

    #[test]
    fn blank_timezone_means_utc() {
        let mut schedule = window("09:00", "10:00");
        schedule.time_zone = String::new();
        assert!(within_send_window(&[schedule], utc("2026-03-02T09:30:00Z")));
    }

    #[test]
    fn disabled_weekday_closes_the_window() {
        let mut schedule = always_open();
        schedule.sunday = false;
        let schedules = [schedule];
        assert!(!within_send_window(&schedules, utc("2026-03-01T12:00:00Z")));
        assert!(within_send_window(&schedules, utc("2026-03-02T12:00:00Z")));
    }

    #[test]
    fn end_before_start_never_opens() {
        let schedules = [window("22:00", "02:00")];
        assert!(!within_send_window(&schedules, utc("2026-03-02T23:15:00Z")));
        assert!(!within_send_window(&schedules, utc("2026-03-02T01:15:00Z")));
        assert!(!within_send_window(&schedules, utc("2026-03-02T12:00:00Z")));
    }

    #[test]
    fn any_enabled_row_opens_the_window() {
        let morning = window("08:00", "12:00");
        let evening = window("18:00", "22:00");
        let schedules = [morning, evening];
        assert!(within_send_window(&schedules, utc("2026-03-02T09:00:00Z")));
        assert!(within_send_window(&schedules, utc("2026-03-02T19:00:00Z")));
        assert!(!within_send_window(&schedules, utc("2026-03-02T15:00:00Z")));
    }

    #[test]
    fn disabled_rows_are_ignored() {
        let mut all_day = always_open();
        all_day.enabled = false;
        let schedules = [all_day, window("08:00", "12:00")];
        assert!(!within_send_window(&schedules, utc("2026-03-02T15:00:00Z")));
        assert!(within_send_window(&schedules, utc("2026-03-02T09:00:00Z")));
        assert!(!within_send_window(&[], utc("2026-03-02T09:00:00Z")));
    }

    #[test]
    fn bad_schedule_closes_the_window() {
        let mut schedule = always_open();
        schedule.time_zone = "Mars/Olympus".into();
        assert!(!within_send_window(&[schedule], utc("2026-03-02T12:00:00Z")));

        assert!(!within_send_window(&[window("9am", "17:00")], utc("2026-03-02T12:00:00Z")));
        assert!(!within_send_window(&[window("9:00", "17:00")], utc("2026-03-02T12:00:00Z")));
    }

    #[test]
    fn daily_cap_allows_up_to_the_limit() {
        assert_eq!(POLICY.check_daily_cap(0), Ok(()));
        assert_eq!(POLICY.check_daily_cap(1), Err(RejectReason::DailyCapReached));
        let unlimited_by_zero = ThrottlePolicy {
            max_daily_send_count: 0,
            ..POLICY
        };
        assert_eq!(
            unlimited_by_zero.check_daily_cap(0),
            Err(RejectReason::DailyCapReached)
        );
    }

    #[test]
    fn new_number_is_eligible() {
        assert_eq!(POLICY.check_record(None, utc("2026-03-02T12:00:00Z")), Ok(()));
        assert_eq!(next_sent_count(None), 1);
    }

    #[test]
    fn stop_flag_rejects_first() {
        let r = record("2025-01-01T00:00:00Z", 0, true);
        assert_eq!(
            POLICY.check_record(Some(&r), utc("2026-03-02T12:00:00Z")),
            Err(RejectReason::Stopped)
        );
    }

    #[test]
    fn frequency_is_measured_from_last_send() {
        let now = utc("2026-03-31T12:00:00Z");
        let recent = record("2026-03-01T12:00:01Z", 1, false);
        assert_eq!(
            POLICY.check_record(Some(&recent), now),
            Err(RejectReason::SentTooRecently)
        );
        let old_enough = record("2026-03-01T12:00:00Z", 1, false);
        assert_eq!(POLICY.check_record(Some(&old_enough), now), Ok(()));
    }

    #[test]
    fn send_count_check_is_strict() {
        let now = utc("2026-03-02T12:00:00Z");
        let at_limit = record("2025-01-01T00:00:00Z", 2, false);
        assert_eq!(POLICY.check_record(Some(&at_limit), now), Ok(()));
        assert_eq!(next_sent_count(Some(&at_limit)), 3);
        let over = record("2025-01-01T00:00:00Z", 3, false);
        assert_eq!(
            POLICY.check_record(Some(&over), now),
            Err(RejectReason::MaxSendCountReached)
        );
    }
}

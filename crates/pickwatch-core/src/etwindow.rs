//! Eastern-Time calendar-day window math.
//!
//! The external backend scopes eligible games to "today in ET". The audit
//! suites need the exact UTC instants of that window to assert a pick's
//! `game_time_utc` falls inside it. US DST rules: EDT begins at 2:00 EST
//! on the second Sunday of March (07:00 UTC) and ends at 2:00 EDT on the
//! first Sunday of November (06:00 UTC).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

const EST_OFFSET_HOURS: i64 = 5;
const EDT_OFFSET_HOURS: i64 = 4;

/// A half-open UTC interval covering one ET calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EtWindow {
    /// Whether an instant falls inside the window (`start` inclusive,
    /// `end` exclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// The nth (1-based) occurrence of `weekday` in the given month.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, nth: u32) -> NaiveDate {
    let mut date = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
    let mut seen = 0;
    loop {
        if date.weekday() == weekday {
            seen += 1;
            if seen == nth {
                return date;
            }
        }
        date = date.succ_opt().expect("date in range");
    }
}

/// UTC instant at which DST begins for the given year (2:00 EST).
fn dst_start_utc(year: i32) -> DateTime<Utc> {
    let date = nth_weekday(year, 3, Weekday::Sun, 2);
    Utc.from_utc_datetime(&date.and_hms_opt(7, 0, 0).expect("valid time"))
}

/// UTC instant at which DST ends for the given year (2:00 EDT).
fn dst_end_utc(year: i32) -> DateTime<Utc> {
    let date = nth_weekday(year, 11, Weekday::Sun, 1);
    Utc.from_utc_datetime(&date.and_hms_opt(6, 0, 0).expect("valid time"))
}

/// Whether DST is in effect in the US Eastern zone at a UTC instant.
fn dst_active(utc: DateTime<Utc>) -> bool {
    let year = utc.year();
    utc >= dst_start_utc(year) && utc < dst_end_utc(year)
}

/// UTC-to-ET offset in hours at a UTC instant.
fn et_offset_hours(utc: DateTime<Utc>) -> i64 {
    if dst_active(utc) {
        EDT_OFFSET_HOURS
    } else {
        EST_OFFSET_HOURS
    }
}

/// Convert a naive ET wall-clock time to UTC.
///
/// Resolves the offset by first assuming EST; midnight is never inside
/// the 2:00 transition, so the assumption only needs one correction pass.
fn et_naive_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    let est_guess = Utc.from_utc_datetime(&(naive + Duration::hours(EST_OFFSET_HOURS)));
    Utc.from_utc_datetime(&(naive + Duration::hours(et_offset_hours(est_guess))))
}

/// The ET calendar-day window containing the given UTC instant.
pub fn et_window_for(utc: DateTime<Utc>) -> EtWindow {
    let local = utc - Duration::hours(et_offset_hours(utc));
    let local_date = local.date_naive();
    let next_date = local_date.succ_opt().expect("date in range");

    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).expect("valid midnight");
    EtWindow {
        start: et_naive_to_utc(midnight(local_date)),
        end: et_naive_to_utc(midnight(next_date)),
    }
}

/// The ET calendar-day window for the current moment.
pub fn et_window_today() -> EtWindow {
    et_window_for(Utc::now())
}

// Window resolver - absolute time range and time-axis ticks for an interval
use crate::domain::error::ChartError;
use crate::domain::interval::{Interval, TimeStep};
use chrono::{
    DateTime, Datelike, FixedOffset, Locale, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

/// Absolute time range `[min_t, max_t]` covered by one redraw.
///
/// `max_t` is the instant the window was resolved at; `min_t` sits on a
/// clean boundary so gridlines do not drift with "now". Calendar months
/// are counted on the wall clock of `offset`, the one labels are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    interval: Interval,
    min_t: DateTime<Utc>,
    max_t: DateTime<Utc>,
    offset: FixedOffset,
}

impl TimeWindow {
    pub fn resolve(interval: Interval, now: DateTime<Utc>) -> Self {
        Self::resolve_in(interval, now, Utc.fix())
    }

    /// Same as `resolve`, with month boundaries taken in `offset`.
    pub fn resolve_in(interval: Interval, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let min_t = align_down(now - interval.lookback(), interval.alignment(), offset);
        Self {
            interval,
            min_t,
            max_t: now,
            offset,
        }
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn min_t(&self) -> DateTime<Utc> {
        self.min_t
    }

    pub fn max_t(&self) -> DateTime<Utc> {
        self.max_t
    }

    pub fn step(&self) -> TimeStep {
        self.interval.step()
    }

    /// Width of the window in milliseconds, always positive.
    pub fn range_ms(&self) -> i64 {
        (self.max_t - self.min_t).num_milliseconds()
    }

    /// Every step boundary inside the window, oldest first.
    pub fn ticks(&self) -> Vec<DateTime<Utc>> {
        match self.step() {
            TimeStep::Fixed(step) => {
                let min = self.min_t.timestamp_millis();
                let max = self.max_t.timestamp_millis();
                let first = min + (step - min.rem_euclid(step)) % step;
                if first > max {
                    return Vec::new();
                }
                let count = (max - first) / step + 1;
                (0..count)
                    .filter_map(|i| DateTime::from_timestamp_millis(first + i * step))
                    .collect()
            }
            TimeStep::Months(months) => {
                let months = i64::from(months.max(1));
                let mut first = month_index(self.min_t, self.offset).div_euclid(months) * months;
                if month_start(first, self.offset).is_some_and(|t| t < self.min_t) {
                    first += months;
                }
                let last = month_index(self.max_t, self.offset);
                if first > last {
                    return Vec::new();
                }
                let count = (last - first) / months + 1;
                (0..count)
                    .filter_map(|i| month_start(first + i * months, self.offset))
                    .filter(|t| *t <= self.max_t)
                    .collect()
            }
        }
    }
}

fn align_down(t: DateTime<Utc>, alignment: TimeStep, offset: FixedOffset) -> DateTime<Utc> {
    match alignment {
        TimeStep::Fixed(step) => {
            let aligned = t.timestamp_millis().div_euclid(step) * step;
            DateTime::from_timestamp_millis(aligned).unwrap_or(t)
        }
        TimeStep::Months(months) => {
            let months = i64::from(months.max(1));
            let index = month_index(t, offset).div_euclid(months) * months;
            month_start(index, offset).unwrap_or(t)
        }
    }
}

/// Months elapsed since January 1970 on the `offset` wall clock
fn month_index(t: DateTime<Utc>, offset: FixedOffset) -> i64 {
    let local = t.with_timezone(&offset);
    (i64::from(local.year()) - 1970) * 12 + i64::from(local.month0())
}

fn month_start(index: i64, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let year = i32::try_from(1970 + index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

/// How tick instants are turned into text: which locale and which wall clock.
#[derive(Debug, Clone, Copy)]
pub struct LabelStyle {
    locale: Locale,
    offset: FixedOffset,
}

impl LabelStyle {
    pub fn new(locale: &str, utc_offset_minutes: i32) -> Result<Self, ChartError> {
        let parsed = Locale::try_from(locale)
            .map_err(|_| ChartError::InvalidLabels(format!("unknown locale `{}`", locale)))?;
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ChartError::InvalidLabels(format!(
                    "UTC offset of {} minutes is out of range",
                    utc_offset_minutes
                ))
            })?;
        Ok(Self {
            locale: parsed,
            offset,
        })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn format(&self, interval: Interval, t: DateTime<Utc>) -> String {
        t.with_timezone(&self.offset)
            .format_localized(interval.label_pattern(), self.locale)
            .to_string()
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            locale: Locale::POSIX,
            offset: Utc.fix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interval::{DAY_MS, HOUR_MS};
    use proptest::prelude::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    // 2024-03-15T13:47:12.345Z
    const NOW_MS: i64 = 1_710_510_432_345;

    #[test]
    fn test_day_window_floors_to_the_hour() {
        let window = TimeWindow::resolve(Interval::Day, at(NOW_MS));

        let expected = (NOW_MS - 86_400_000).div_euclid(3_600_000) * 3_600_000;
        assert_eq!(window.min_t().timestamp_millis(), expected);
        assert_eq!(window.max_t(), at(NOW_MS));
        assert_eq!(window.step(), TimeStep::Fixed(7_200_000));
    }

    #[test]
    fn test_window_is_aligned_and_non_empty_for_every_interval() {
        let instants = [0, 1, HOUR_MS - 1, NOW_MS, 951_782_400_000, -86_400_001];
        for interval in Interval::ALL {
            for now in instants {
                let window = TimeWindow::resolve(interval, at(now));
                assert!(window.min_t() < window.max_t(), "{} at {}", interval, now);
                assert!(window.range_ms() > 0);

                let min = window.min_t();
                match interval.alignment() {
                    TimeStep::Fixed(unit) => {
                        assert_eq!(min.timestamp_millis().rem_euclid(unit), 0)
                    }
                    TimeStep::Months(_) => {
                        assert_eq!((min.day(), min.timestamp() % 86_400), (1, 0))
                    }
                }
            }
        }
    }

    #[test]
    fn test_week_and_month_windows_start_on_step_boundaries() {
        let week = TimeWindow::resolve(Interval::Week, at(NOW_MS));
        assert_eq!(week.min_t().timestamp_millis() % DAY_MS, 0);
        assert!(week.range_ms() >= 7 * DAY_MS);
        assert!(week.range_ms() < 8 * DAY_MS);

        let month = TimeWindow::resolve(Interval::Month, at(NOW_MS));
        assert_eq!(month.min_t().timestamp_millis() % (2 * DAY_MS), 0);
        assert!(month.range_ms() >= 30 * DAY_MS);
    }

    #[test]
    fn test_day_ticks_land_on_two_hour_boundaries() {
        let window = TimeWindow::resolve(Interval::Day, at(NOW_MS));
        let ticks = window.ticks();

        assert_eq!(ticks.len(), 12);
        for tick in &ticks {
            assert_eq!(tick.timestamp_millis() % (2 * HOUR_MS), 0);
            assert!(*tick >= window.min_t() && *tick <= window.max_t());
        }
        assert_eq!(ticks[0], Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_ticks_include_both_ends_when_they_sit_on_a_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let ticks = TimeWindow::resolve(Interval::Day, now).ticks();

        assert_eq!(ticks.len(), 13);
        assert_eq!(ticks.first(), Some(&(now - chrono::TimeDelta::hours(24))));
        assert_eq!(ticks.last(), Some(&now));
    }

    #[test]
    fn test_year_window_starts_on_a_month_and_ticks_monthly() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 0, 0).unwrap();
        let window = TimeWindow::resolve(Interval::Year, now);

        // 365 days before 2024-03-15 is 2023-03-16 (2024 is a leap year)
        assert_eq!(window.min_t(), Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap());

        let ticks = window.ticks();
        assert_eq!(ticks.len(), 13);
        assert_eq!(ticks[0], window.min_t());
        assert_eq!(ticks[12], Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(ticks.iter().all(|t| t.day() == 1 && t.timestamp() % 86_400 == 0));
    }

    #[test]
    fn test_year_ticks_follow_month_starts_west_of_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 0, 0).unwrap();
        let labels = LabelStyle::new("POSIX", -300).unwrap();
        let window = TimeWindow::resolve_in(Interval::Year, now, labels.offset());

        assert_eq!(window.min_t(), Utc.with_ymd_and_hms(2023, 3, 1, 5, 0, 0).unwrap());

        let names: Vec<String> = window
            .ticks()
            .into_iter()
            .map(|t| labels.format(Interval::Year, t))
            .collect();
        assert_eq!(
            names,
            vec![
                "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan",
                "Feb", "Mar"
            ]
        );
    }

    #[test]
    fn test_year_ticks_follow_month_starts_east_of_utc() {
        // 2024-02-29T23:30Z is already March 1st at +01:00
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap();
        let labels = LabelStyle::new("POSIX", 60).unwrap();
        let ticks = TimeWindow::resolve_in(Interval::Year, now, labels.offset()).ticks();

        assert_eq!(ticks.last(), Some(&Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap()));
        assert_eq!(labels.format(Interval::Year, ticks[ticks.len() - 1]), "Mar");
    }

    #[test]
    fn test_labels_follow_interval_pattern_and_offset() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();

        let utc = LabelStyle::default();
        assert_eq!(utc.format(Interval::Day, t), "14:00");
        assert_eq!(utc.format(Interval::Week, t), "03/15");
        assert_eq!(utc.format(Interval::Year, t), "Mar");

        let cet = LabelStyle::new("POSIX", 60).unwrap();
        assert_eq!(cet.format(Interval::Day, t), "15:00");
    }

    #[test]
    fn test_label_style_rejects_bad_settings() {
        assert!(matches!(
            LabelStyle::new("xx_NOPE", 0),
            Err(ChartError::InvalidLabels(_))
        ));
        assert!(matches!(
            LabelStyle::new("POSIX", 24 * 60),
            Err(ChartError::InvalidLabels(_))
        ));
    }

    fn interval_strategy() -> impl Strategy<Value = Interval> {
        prop::sample::select(Interval::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn window_is_aligned_and_non_empty(
            interval in interval_strategy(),
            now_ms in -2_000_000_000_000i64..4_000_000_000_000,
            offset_minutes in -720i32..=840,
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let now = at(now_ms);
            let window = TimeWindow::resolve_in(interval, now, offset);

            prop_assert!(window.min_t() < window.max_t());
            prop_assert_eq!(window.max_t(), now);
            prop_assert!(window.min_t() <= now - interval.lookback());

            let slack = now - interval.lookback() - window.min_t();
            match interval.alignment() {
                TimeStep::Fixed(unit) => {
                    prop_assert_eq!(window.min_t().timestamp_millis().rem_euclid(unit), 0);
                    prop_assert!(slack.num_milliseconds() < unit);
                }
                TimeStep::Months(_) => {
                    let local = window.min_t().with_timezone(&offset);
                    prop_assert_eq!(local.day(), 1);
                    prop_assert_eq!(local.time(), NaiveTime::MIN);
                    prop_assert!(slack.num_days() < 31);
                }
            }
        }

        #[test]
        fn ticks_are_sorted_and_inside_the_window(
            interval in interval_strategy(),
            now_ms in -2_000_000_000_000i64..4_000_000_000_000,
            offset_minutes in -720i32..=840,
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let window = TimeWindow::resolve_in(interval, at(now_ms), offset);
            let ticks = window.ticks();

            prop_assert!(!ticks.is_empty());
            prop_assert!(ticks.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(ticks.iter().all(|t| *t >= window.min_t() && *t <= window.max_t()));
        }
    }
}

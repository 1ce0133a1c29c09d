use chrono::{DateTime, Days, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Time window selector for the dashboard. Governs both the subscription's
/// range query and the aggregation granularity (hourly for `Today`, daily
/// otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeMode {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "last-3-days")]
    Last3Days,
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
    #[serde(rename = "all")]
    All,
}

impl std::str::FromStr for RangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "last-3-days" => Ok(Self::Last3Days),
            "last-7-days" => Ok(Self::Last7Days),
            "last-30-days" => Ok(Self::Last30Days),
            "all" => Ok(Self::All),
            other => Err(format!("unknown range mode: {other}")),
        }
    }
}

impl RangeMode {
    /// Days before today covered by a bounded range, today included.
    fn days_back(&self) -> Option<u64> {
        match self {
            Self::Today => Some(0),
            Self::Last3Days => Some(2),
            Self::Last7Days => Some(6),
            Self::Last30Days => Some(29),
            Self::All => None,
        }
    }

    /// `[start, end)` bounds evaluated against `now`, or `None` for the
    /// unbounded range. `start` is local midnight N days back; `end` is local
    /// midnight of tomorrow, so today is always fully included.
    pub fn bounds_at(&self, now: DateTime<Local>) -> Option<(DateTime<Local>, DateTime<Local>)> {
        let days_back = self.days_back()?;
        let today = start_of_day(now);
        let start = today
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(today);
        let end = today.checked_add_days(Days::new(1)).unwrap_or(today);
        Some((start, end))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Last3Days => "Last 3 days",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::All => "All",
        }
    }

    pub fn cycle_next(&self) -> RangeMode {
        match self {
            Self::Today => Self::Last3Days,
            Self::Last3Days => Self::Last7Days,
            Self::Last7Days => Self::Last30Days,
            Self::Last30Days => Self::All,
            Self::All => Self::Today,
        }
    }
}

/// Local midnight of the day containing `t`. On the rare days where local
/// midnight does not exist (DST gap), the earliest valid instant is used.
pub fn start_of_day(t: DateTime<Local>) -> DateTime<Local> {
    let naive = t.date_naive().and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn three_day_window_is_inclusive_of_today() {
        let now = local(2024, 6, 10, 15, 0, 0);
        let (start, end) = RangeMode::Last3Days.bounds_at(now).unwrap();
        assert_eq!(start, local(2024, 6, 8, 0, 0, 0));
        assert_eq!(end, local(2024, 6, 11, 0, 0, 0));

        // [start, end): midnight of the first day is in, the second before is out.
        let included = local(2024, 6, 8, 0, 0, 0);
        let excluded = local(2024, 6, 7, 23, 59, 59);
        assert!(included >= start && included < end);
        assert!(!(excluded >= start && excluded < end));
    }

    #[test]
    fn today_covers_exactly_one_day() {
        let now = local(2024, 6, 10, 0, 0, 1);
        let (start, end) = RangeMode::Today.bounds_at(now).unwrap();
        assert_eq!(start, local(2024, 6, 10, 0, 0, 0));
        assert_eq!(end, local(2024, 6, 11, 0, 0, 0));
    }

    #[test]
    fn bounded_ranges_span_their_day_counts() {
        let now = local(2024, 6, 10, 12, 0, 0);
        let days = |mode: RangeMode| {
            let (start, end) = mode.bounds_at(now).unwrap();
            (end - start).num_days()
        };
        assert_eq!(days(RangeMode::Today), 1);
        assert_eq!(days(RangeMode::Last3Days), 3);
        assert_eq!(days(RangeMode::Last7Days), 7);
        assert_eq!(days(RangeMode::Last30Days), 30);
    }

    #[test]
    fn all_is_unbounded() {
        assert_eq!(RangeMode::All.bounds_at(Local::now()), None);
    }

    #[test]
    fn cycle_visits_every_mode_and_wraps() {
        let mut mode = RangeMode::Today;
        let mut count = 0;
        loop {
            mode = mode.cycle_next();
            count += 1;
            if mode == RangeMode::Today {
                break;
            }
        }
        assert_eq!(count, 5);
    }
}

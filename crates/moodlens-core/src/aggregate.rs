use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::models::diary::DiaryRecord;
use crate::models::range::RangeMode;

/// One labeled aggregation slot for the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

/// Card values derived from the current range: total records and the number
/// of non-zero buckets ("active hours" / "active days").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSummary {
    pub total: usize,
    pub active: usize,
}

/// Group records into chart buckets for the given range mode.
///
/// Pure and synchronous: fixed inputs give fixed outputs. Records without a
/// resolvable timestamp contribute to no bucket in any mode.
pub fn bucketize(records: &[DiaryRecord], range: RangeMode) -> Vec<Bucket> {
    match range {
        RangeMode::Today => hourly_buckets(records),
        _ => daily_buckets(records),
    }
}

/// Exactly 24 buckets labeled "0:00" … "23:00", pre-seeded at zero and always
/// present regardless of data; each record increments its local hour-of-day.
fn hourly_buckets(records: &[DiaryRecord]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (0..24)
        .map(|h| Bucket {
            label: format!("{h}:00"),
            count: 0,
        })
        .collect();
    for record in records {
        if let Some(date) = record.created_date {
            buckets[date.hour() as usize].count += 1;
        }
    }
    buckets
}

/// One bucket per local calendar day with at least one record, ascending by
/// actual date (not label), labeled with a short month/day string.
fn daily_buckets(records: &[DiaryRecord]) -> Vec<Bucket> {
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.created_date {
            *by_day.entry(date.date_naive()).or_insert(0) += 1;
        }
    }
    by_day
        .into_iter()
        .map(|(day, count)| Bucket {
            label: format!("{} {}", month_abbrev(day.month()), day.day()),
            count,
        })
        .collect()
}

fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

pub fn summarize(records: &[DiaryRecord], buckets: &[Bucket]) -> RangeSummary {
    RangeSummary {
        total: records.len(),
        active: buckets.iter().filter(|b| b.count > 0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};

    fn record(id: &str, created: Option<DateTime<Local>>) -> DiaryRecord {
        DiaryRecord {
            id: id.to_string(),
            content: None,
            keywords: None,
            suggestion: None,
            emotional_reflection: None,
            mood: String::new(),
            created_date: created,
            images: Vec::new(),
        }
    }

    fn at(d: u32, h: u32) -> Option<DateTime<Local>> {
        Some(Local.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap())
    }

    #[test]
    fn hourly_mode_always_yields_24_buckets() {
        let records = vec![
            record("a", at(10, 0)),
            record("b", at(10, 0)),
            record("c", at(10, 5)),
            record("d", at(10, 23)),
        ];
        let buckets = bucketize(&records, RangeMode::Today);

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0].label, "0:00");
        assert_eq!(buckets[23].label, "23:00");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[5].count, 1);
        assert_eq!(buckets[23].count, 1);
        let other: u64 = buckets
            .iter()
            .enumerate()
            .filter(|(i, _)| ![0, 5, 23].contains(i))
            .map(|(_, b)| b.count)
            .sum();
        assert_eq!(other, 0);
    }

    #[test]
    fn hourly_mode_with_no_records_is_all_zero() {
        let buckets = bucketize(&[], RangeMode::Today);
        assert_eq!(buckets.len(), 24);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn records_without_dates_count_in_no_bucket() {
        let records = vec![record("a", None), record("b", at(10, 3))];

        let hourly = bucketize(&records, RangeMode::Today);
        assert_eq!(hourly.iter().map(|b| b.count).sum::<u64>(), 1);

        let daily = bucketize(&records, RangeMode::Last7Days);
        assert_eq!(daily.iter().map(|b| b.count).sum::<u64>(), 1);
    }

    #[test]
    fn daily_buckets_exist_only_for_non_empty_days_in_date_order() {
        // Insertion order deliberately scrambled.
        let records = vec![
            record("a", at(9, 14)),
            record("b", at(2, 8)),
            record("c", at(9, 3)),
            record("d", at(30, 23)),
        ];
        let buckets = bucketize(&records, RangeMode::Last30Days);

        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Jun 2", "Jun 9", "Jun 30"]);
        let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn daily_buckets_order_by_date_not_label() {
        // "Apr 2" sorts before "Jun 1" alphabetically too, but "Jul 1" does
        // not sort after "Jun 30" as a string.
        let records = vec![
            record("jul", Some(Local.with_ymd_and_hms(2024, 7, 1, 1, 0, 0).unwrap())),
            record("jun", at(30, 1)),
        ];
        let buckets = bucketize(&records, RangeMode::All);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Jun 30", "Jul 1"]);
    }

    #[test]
    fn summary_counts_totals_and_active_buckets() {
        let records = vec![
            record("a", at(10, 0)),
            record("b", at(10, 0)),
            record("c", None),
        ];
        let buckets = bucketize(&records, RangeMode::Today);
        let summary = summarize(&records, &buckets);
        // Dateless records still count toward the range total, just not to
        // any bucket.
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 1);
    }
}

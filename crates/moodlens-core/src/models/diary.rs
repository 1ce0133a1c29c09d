use std::cmp::Reverse;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::firestore::{Document, Value};
use crate::models::mood::MoodFilter;

/// A normalized diary entry.
///
/// Built once per snapshot from a raw document and never mutated afterwards;
/// a new snapshot replaces the whole list. Every source field is optional;
/// resolution failures become absent fields, never errors.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryRecord {
    pub id: String,
    pub content: Option<String>,
    pub keywords: Option<String>,
    pub suggestion: Option<String>,
    pub emotional_reflection: Option<String>,
    /// Canonical (trimmed, lower-cased) mood; empty when absent.
    pub mood: String,
    /// `None` means "no date": excluded from bucketing, never "now".
    pub created_date: Option<DateTime<Local>>,
    /// Unique, non-empty image URLs in first-seen order.
    pub images: Vec<String>,
}

impl DiaryRecord {
    pub fn from_document(doc: &Document) -> DiaryRecord {
        let image_list: Vec<&str> = doc
            .array_field("imageUrls")
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        DiaryRecord {
            id: doc.id.clone(),
            content: doc.str_field("content").map(str::to_string),
            keywords: doc.str_field("keywords").map(str::to_string),
            suggestion: doc.str_field("suggestion").map(str::to_string),
            emotional_reflection: doc.str_field("emotionalReflection").map(str::to_string),
            mood: normalize_mood(doc.str_field("mood")),
            created_date: resolve_timestamp(doc.field("createdAt")),
            images: collect_images(doc.str_field("imageUrl"), &image_list),
        }
    }

    pub fn matches_mood(&self, filter: &MoodFilter) -> bool {
        match filter {
            MoodFilter::All => true,
            MoodFilter::Mood(mood) => self.mood == *mood,
        }
    }

    /// Keyword tags for rendering: the comma-separated string split into
    /// trimmed, non-empty chips.
    pub fn keyword_tags(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|k| k.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Canonicalize a mood label: `""` for absent, else trimmed and lower-cased.
pub fn normalize_mood(raw: Option<&str>) -> String {
    match raw {
        Some(m) => m.trim().to_lowercase(),
        None => String::new(),
    }
}

/// Resolve a raw `createdAt` field into a local point in time.
///
/// Three shapes are accepted: the store's native timestamp value, a
/// `seconds`/`nanos` integer pair (the SDK-split encoding), and an ISO-8601
/// string. Anything else, including unparseable strings, is `None`.
pub fn resolve_timestamp(raw: Option<&Value>) -> Option<DateTime<Local>> {
    match raw? {
        Value::Timestamp(t) => Some(t.with_timezone(&Local)),
        Value::Map(fields) => {
            let seconds = fields.get("seconds").and_then(Value::as_integer)?;
            let nanos = fields
                .get("nanos")
                .and_then(Value::as_integer)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            Utc.timestamp_opt(seconds, nanos)
                .single()
                .map(|t| t.with_timezone(&Local))
        }
        Value::String(s) => parse_iso_date(s),
        _ => None,
    }
}

fn parse_iso_date(s: &str) -> Option<DateTime<Local>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Local));
    }
    // Zone-less strings (e.g. "2024-06-10T08:00:00") are taken as local time.
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    naive.and_local_timezone(Local).earliest()
}

/// Merge the single `imageUrl` and the `imageUrls` list into one ordered,
/// de-duplicated sequence: primary first when non-empty, then each non-empty
/// list element not already present, in first-seen order.
pub fn collect_images(primary: Option<&str>, list: &[&str]) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    for candidate in primary.into_iter().chain(list.iter().copied()) {
        if candidate.is_empty() {
            continue;
        }
        if !images.iter().any(|existing| existing == candidate) {
            images.push(candidate.to_string());
        }
    }
    images
}

/// Stable sort, newest first; records without a resolvable date go last.
/// Guards against undefined server-side ordering when the sort field is
/// missing or malformed on some documents.
pub fn sort_newest_first(records: &mut [DiaryRecord]) {
    records.sort_by_key(|r| Reverse(r.created_date));
}

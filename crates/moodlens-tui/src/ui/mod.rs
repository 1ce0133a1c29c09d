pub mod components;
pub mod terminal;
pub mod theme;
pub mod views;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

use moodlens_core::aggregate::{self, Bucket, RangeSummary};
use moodlens_core::auth::Session;
use moodlens_core::models::{DiaryRecord, MoodFilter, RangeMode, UserProfile};
use moodlens_core::CoreConfig;

pub use terminal::{init as init_terminal, restore as restore_terminal, Tui};
use views::login::LoginForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Diaries,
    Dashboard,
}

/// What the feed is currently showing. `Unavailable` is the subscription's
/// terminal failure state: no data, no retry, re-subscribe to recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ready,
    Unavailable(String),
}

pub struct App {
    pub config: CoreConfig,
    pub running: bool,
    pub view: View,
    pub login: LoginForm,
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,

    /// The subscribed record list, newest first. Replaced wholesale on every
    /// snapshot; the mood filter only ever derives a view over it.
    pub records: Vec<DiaryRecord>,
    pub feed_status: FeedStatus,
    pub mood_filter: MoodFilter,
    pub selected: usize,

    pub range: RangeMode,
    pub buckets: Vec<Bucket>,
    pub summary: RangeSummary,
}

impl App {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            running: true,
            view: View::Login,
            login: LoginForm::default(),
            session: None,
            profile: None,
            records: Vec::new(),
            feed_status: FeedStatus::Loading,
            mood_filter: MoodFilter::All,
            selected: 0,
            range: RangeMode::Today,
            buckets: Vec::new(),
            summary: RangeSummary { total: 0, active: 0 },
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// The query scope for the currently mounted view: the feed view shows
    /// everything, the dashboard is scoped to its selected range.
    pub fn subscription_range(&self) -> RangeMode {
        match self.view {
            View::Dashboard => self.range,
            _ => RangeMode::All,
        }
    }

    pub fn complete_login(&mut self, session: Session, profile: UserProfile) {
        self.session = Some(session);
        self.profile = Some(profile);
        self.login = LoginForm::default();
        self.view = View::Diaries;
        self.feed_status = FeedStatus::Loading;
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.profile = None;
        self.records.clear();
        self.selected = 0;
        self.feed_status = FeedStatus::Loading;
        self.view = View::Login;
        self.recompute_derived();
    }

    pub fn switch_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.feed_status = FeedStatus::Loading;
            self.selected = 0;
        }
    }

    pub fn apply_snapshot(&mut self, records: Vec<DiaryRecord>) {
        self.records = records;
        self.feed_status = FeedStatus::Ready;
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
        self.recompute_derived();
    }

    pub fn set_unavailable(&mut self, message: String) {
        self.feed_status = FeedStatus::Unavailable(message);
    }

    /// Buckets and summary cards are pure derived state, recomputed whenever
    /// the records or the range selector change.
    pub fn recompute_derived(&mut self) {
        self.buckets = aggregate::bucketize(&self.records, self.range);
        self.summary = aggregate::summarize(&self.records, &self.buckets);
    }

    pub fn cycle_mood_filter(&mut self) {
        self.mood_filter = self.mood_filter.cycle_next();
        self.selected = 0;
    }

    pub fn cycle_range(&mut self) {
        self.range = self.range.cycle_next();
        self.feed_status = FeedStatus::Loading;
        self.recompute_derived();
    }

    /// The mood-filtered view of the feed. Never mutates `records`.
    pub fn filtered_records(&self) -> Vec<&DiaryRecord> {
        self.records
            .iter()
            .filter(|r| r.matches_mood(&self.mood_filter))
            .collect()
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let len = self.filtered_records().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(f.area());

    match app.view {
        View::Login => views::login::render_login(f, app, chunks[0]),
        View::Diaries => views::diaries::render_diaries(f, app, chunks[0]),
        View::Dashboard => views::dashboard::render_dashboard(f, app, chunks[0]),
    }

    components::statusbar::render_statusbar(f, chunks[1], app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn record(id: &str, mood: &str) -> DiaryRecord {
        DiaryRecord {
            id: id.to_string(),
            content: None,
            keywords: None,
            suggestion: None,
            emotional_reflection: None,
            mood: mood.to_string(),
            created_date: Some(Local.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()),
            images: Vec::new(),
        }
    }

    #[test]
    fn mood_filter_is_a_view_not_a_mutation() {
        let mut app = App::new(CoreConfig::default());
        app.apply_snapshot(vec![
            record("a", "joy"),
            record("b", "sadness"),
            record("c", "joy"),
        ]);

        let original: Vec<String> = app.records.iter().map(|r| r.id.clone()).collect();

        app.mood_filter = MoodFilter::Mood("sadness");
        let filtered: Vec<&str> = app
            .filtered_records()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(filtered, vec!["b"]);

        app.mood_filter = MoodFilter::All;
        let restored: Vec<String> = app.records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(restored, original);
        assert_eq!(app.filtered_records().len(), 3);
    }

    #[test]
    fn snapshot_replaces_the_whole_list() {
        let mut app = App::new(CoreConfig::default());
        app.apply_snapshot(vec![record("a", "joy"), record("b", "joy")]);
        app.apply_snapshot(vec![record("c", "fear")]);
        let ids: Vec<&str> = app.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
        assert_eq!(app.feed_status, FeedStatus::Ready);
    }

    #[test]
    fn range_cycle_recomputes_buckets() {
        let mut app = App::new(CoreConfig::default());
        app.apply_snapshot(vec![record("a", "joy")]);
        assert_eq!(app.buckets.len(), 24); // Today: hourly

        app.cycle_range(); // Last3Days: daily
        assert_eq!(app.buckets.len(), 1);
        assert_eq!(app.feed_status, FeedStatus::Loading);
    }

    #[test]
    fn dashboard_scopes_subscription_to_selected_range() {
        let mut app = App::new(CoreConfig::default());
        assert_eq!(app.subscription_range(), RangeMode::All);
        app.view = View::Dashboard;
        assert_eq!(app.subscription_range(), RangeMode::Today);
    }
}

//! Reading-activity tracking: streaks, engagement totals and badges
//!
//! Day granularity throughout. The streak is always re-derivable from
//! `lastDate` against the current date, so a stale persisted count decays
//! on load. Persistence failures are logged and swallowed; the in-memory
//! state stays authoritative for the running session.

use crate::store::{SettingsStore, KEY_DAILY_BREAD, KEY_STREAK};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const BADGE_WELCOME: &str = "Welcome Enthusiast";
pub const BADGE_STARTER: &str = "Bible Starter";
pub const BADGE_INTERESSANT: &str = "Bible Interessant";
pub const BADGE_EXPLORER: &str = "Bible Explorer";
pub const BADGE_KNOWLEDGE: &str = "Bible Knowledge Gainer";
pub const BADGE_ENTHUSIAST: &str = "Bible Enthusiast";
pub const BADGE_MONTH: &str = "Achievement of the Month";
pub const BADGE_YEAR: &str = "Bible User of the Year";

/// Persisted under `userStreakData`, field names match the stored JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingState {
    /// Consecutive calendar days with at least one reading.
    pub count: u32,
    /// All-time count of recorded read events.
    pub total: u32,
    /// Midnight of the last reading day, as an ISO timestamp.
    pub last_date: Option<String>,
    /// Foregrounded minutes, accumulated by the minute tick.
    pub time_spent: u32,
    /// Distinct calendar days with at least one reading.
    pub days_engaged: u32,
    pub badges: Vec<String>,
}

/// The badge set is rebuilt from scratch on every call; nothing is
/// grandfathered in.
pub fn compute_badges(time_spent: u32, days_engaged: u32) -> Vec<String> {
    let mut badges = vec![BADGE_WELCOME.to_string()];
    if time_spent >= 2 {
        badges.push(BADGE_STARTER.to_string());
    }
    if time_spent >= 10 {
        badges.push(BADGE_INTERESSANT.to_string());
    }
    if time_spent >= 60 {
        badges.push(BADGE_EXPLORER.to_string());
    }
    if days_engaged >= 10 {
        badges.push(BADGE_KNOWLEDGE.to_string());
    }
    if days_engaged >= 20 {
        badges.push(BADGE_ENTHUSIAST.to_string());
    }
    if days_engaged >= 30 {
        badges.push(BADGE_MONTH.to_string());
    }
    if days_engaged >= 365 {
        badges.push(BADGE_YEAR.to_string());
    }
    badges
}

#[derive(Debug, Default)]
pub struct StreakEngine {
    state: ReadingState,
}

impl StreakEngine {
    pub fn new(state: ReadingState) -> Self {
        Self { state }
    }

    /// Restore persisted state and run the passive decay check: a streak
    /// whose last reading is more than one day old resets immediately,
    /// before any new activity is recorded.
    pub fn load(store: &SettingsStore) -> Self {
        let state = match store.get_json::<ReadingState>(KEY_STREAK) {
            Ok(Some(state)) => state,
            Ok(None) => ReadingState::default(),
            Err(e) => {
                tracing::warn!("Could not restore streak state: {:#}", e);
                ReadingState::default()
            }
        };

        let mut engine = Self { state };
        if engine.apply_decay_on(Local::now().date_naive()) {
            engine.persist(store);
        }
        engine
    }

    pub fn state(&self) -> &ReadingState {
        &self.state
    }

    fn last_reading_date(&self) -> Option<NaiveDate> {
        self.state.last_date.as_deref().and_then(parse_reading_date)
    }

    /// Returns true when the streak was reset and needs persisting.
    pub fn apply_decay_on(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.last_reading_date() else {
            return false;
        };
        if (today - last).num_days() > 1 {
            self.state.count = 0;
            return true;
        }
        false
    }

    pub fn record_activity(&mut self) {
        self.record_activity_on(Local::now().date_naive());
    }

    /// One reading event. Streak and days-engaged move at most once per
    /// calendar day; the total read count moves every time. A clock that
    /// has gone backward (negative day diff) is treated like a repeat of
    /// the already-counted day and does not rewind `lastDate`.
    pub fn record_activity_on(&mut self, today: NaiveDate) {
        match self.last_reading_date() {
            None => {
                self.state.count = 1;
                self.state.days_engaged += 1;
                self.state.last_date = Some(midnight_iso(today));
            }
            Some(last) => {
                let diff = (today - last).num_days();
                if diff == 1 {
                    self.state.count += 1;
                    self.state.days_engaged += 1;
                } else if diff > 1 {
                    self.state.count = 1;
                    self.state.days_engaged += 1;
                }
                if diff >= 0 {
                    self.state.last_date = Some(midnight_iso(today));
                }
            }
        }

        self.state.total += 1;
        self.state.badges = compute_badges(self.state.time_spent, self.state.days_engaged);
    }

    /// Minute tick while the app is foregrounded.
    pub fn tick_minute(&mut self) {
        self.state.time_spent += 1;
        self.state.badges = compute_badges(self.state.time_spent, self.state.days_engaged);
    }

    /// Best-effort write-back; memory remains the source of truth.
    pub fn persist(&self, store: &SettingsStore) {
        if let Err(e) = store.set_json(KEY_STREAK, &self.state) {
            tracing::warn!("Could not persist streak state: {:#}", e);
        }
    }
}

/// Midnight of a reading day as an ISO timestamp.
fn midnight_iso(day: NaiveDate) -> String {
    day.and_time(NaiveTime::MIN).and_utc().to_rfc3339()
}

fn parse_reading_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

// === Daily bread ===

#[derive(Debug, Serialize, Deserialize)]
struct DailyBreadRecord {
    date: String,
}

/// Same rendering as JS `Date.toDateString()`, which the stored records use.
fn date_string(day: NaiveDate) -> String {
    day.format("%a %b %d %Y").to_string()
}

pub fn mark_daily_bread(store: &SettingsStore, today: NaiveDate) {
    let record = DailyBreadRecord { date: date_string(today) };
    if let Err(e) = store.set_json(KEY_DAILY_BREAD, &record) {
        tracing::warn!("Could not persist daily bread status: {:#}", e);
    }
}

pub fn daily_bread_read(store: &SettingsStore, today: NaiveDate) -> bool {
    match store.get_json::<DailyBreadRecord>(KEY_DAILY_BREAD) {
        Ok(Some(record)) => record.date == date_string(today),
        Ok(None) => false,
        Err(e) => {
            tracing::warn!("Could not read daily bread status: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn engine_with(count: u32, last: Option<NaiveDate>, days_engaged: u32) -> StreakEngine {
        StreakEngine::new(ReadingState {
            count,
            days_engaged,
            last_date: last.map(midnight_iso),
            ..ReadingState::default()
        })
    }

    #[test]
    fn first_activity_starts_streak() {
        let mut engine = StreakEngine::default();
        engine.record_activity_on(day("2026-08-06"));
        assert_eq!(engine.state().count, 1);
        assert_eq!(engine.state().days_engaged, 1);
        assert_eq!(engine.state().total, 1);
        assert!(engine.state().badges.contains(&BADGE_WELCOME.to_string()));
    }

    #[test]
    fn same_day_activity_is_idempotent_except_total() {
        let mut engine = StreakEngine::default();
        let today = day("2026-08-06");
        engine.record_activity_on(today);
        engine.record_activity_on(today);
        assert_eq!(engine.state().count, 1);
        assert_eq!(engine.state().days_engaged, 1);
        assert_eq!(engine.state().total, 2);
    }

    #[test]
    fn consecutive_day_extends_streak() {
        let mut engine = engine_with(4, Some(day("2026-08-05")), 4);
        engine.record_activity_on(day("2026-08-06"));
        assert_eq!(engine.state().count, 5);
        assert_eq!(engine.state().days_engaged, 5);
    }

    #[test]
    fn gap_resets_streak_to_one_but_counts_the_day() {
        let mut engine = engine_with(7, Some(day("2026-08-03")), 12);
        engine.record_activity_on(day("2026-08-06"));
        assert_eq!(engine.state().count, 1);
        assert_eq!(engine.state().days_engaged, 13);
        assert_eq!(engine.state().total, 1);
    }

    #[test]
    fn clock_moved_backward_counts_as_same_day() {
        let mut engine = engine_with(3, Some(day("2026-08-06")), 3);
        engine.record_activity_on(day("2026-08-04"));
        assert_eq!(engine.state().count, 3);
        assert_eq!(engine.state().days_engaged, 3);
        assert_eq!(engine.state().total, 1);
        // lastDate is not rewound.
        assert_eq!(
            engine.state().last_date.as_deref().and_then(parse_reading_date),
            Some(day("2026-08-06"))
        );
    }

    #[test]
    fn decay_resets_stale_streak_without_activity() {
        let mut engine = engine_with(9, Some(day("2026-08-01")), 9);
        assert!(engine.apply_decay_on(day("2026-08-06")));
        assert_eq!(engine.state().count, 0);
        // Yesterday's streak survives the load check.
        let mut fresh = engine_with(9, Some(day("2026-08-05")), 9);
        assert!(!fresh.apply_decay_on(day("2026-08-06")));
        assert_eq!(fresh.state().count, 9);
    }

    #[test]
    fn minute_tick_accumulates_time() {
        let mut engine = StreakEngine::default();
        engine.tick_minute();
        engine.tick_minute();
        assert_eq!(engine.state().time_spent, 2);
        assert!(engine.state().badges.contains(&BADGE_STARTER.to_string()));
    }

    #[test]
    fn badge_set_is_rebuilt_from_totals() {
        let badges = compute_badges(65, 31);
        let expected = [
            BADGE_WELCOME,
            BADGE_STARTER,
            BADGE_INTERESSANT,
            BADGE_EXPLORER,
            BADGE_KNOWLEDGE,
            BADGE_ENTHUSIAST,
            BADGE_MONTH,
        ];
        assert_eq!(badges, expected.map(str::to_string));

        // Crossing back below a threshold drops the badge on recompute.
        assert_eq!(compute_badges(0, 0), vec![BADGE_WELCOME.to_string()]);
    }

    #[test]
    fn reading_date_round_trips_through_iso() {
        let today = day("2026-08-06");
        assert_eq!(parse_reading_date(&midnight_iso(today)), Some(today));
        // Bare dates from older installs still parse.
        assert_eq!(parse_reading_date("2026-08-06"), Some(today));
        assert_eq!(parse_reading_date("garbage"), None);
    }

    #[test]
    fn daily_bread_marks_only_today() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();
        let today = day("2026-08-06");

        assert!(!daily_bread_read(&store, today));
        mark_daily_bread(&store, today);
        assert!(daily_bread_read(&store, today));
        assert!(!daily_bread_read(&store, day("2026-08-07")));
    }

    #[test]
    fn persisted_state_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();

        let mut engine = StreakEngine::default();
        engine.record_activity_on(day("2026-08-06"));
        engine.tick_minute();
        engine.persist(&store);

        let restored: ReadingState = store.get_json(KEY_STREAK).unwrap().unwrap();
        assert_eq!(restored.count, 1);
        assert_eq!(restored.total, 1);
        assert_eq!(restored.time_spent, 1);
        assert_eq!(restored.badges, engine.state().badges);
    }
}

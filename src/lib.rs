use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub mod persistence;
pub mod rotation;

/// Default board parameters
pub mod defaults {
    /// Number of lap fields on the operator sheet ("best lap of 5").
    pub const LAP_FIELDS: usize = 5;
    pub const NEW_FASTEST_MS: u32 = 3_500;
    pub const SPONSOR_ROTATE_MS: u32 = 3_000;
    /// Schema version written into every persisted record.
    pub const STATE_VERSION: u32 = 1;

    pub const EVENT_NAME: &str = "Victory SIM Trade Show Challenge";
    pub const SUBTITLE: &str = "Top 10 Win Prizes • Best Lap of 5";
    pub const SPONSOR_URLS_TEXT: &str = "https://placehold.co/900x200/png?text=Sponsor+1\n\
https://placehold.co/900x200/png?text=Sponsor+2\n\
https://placehold.co/900x200/png?text=Sponsor+3";
    pub const SHOW_LOGO: bool = true;
}

// "M:SS.mmm" lap clock notation, e.g. 1:02.345
static LAP_CLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2}(?:\.\d+)?)$").unwrap());

/// Parse one lap field into seconds.
///
/// Accepts a plain decimal number of seconds (`"62.345"`) or lap clock
/// notation (`"1:02.345"`). Returns `None` for empty, unparsable,
/// non-finite or non-positive input.
pub fn parse_lap_seconds(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }

    let seconds = match LAP_CLOCK_REGEX.captures(trimmed) {
        Some(captures) => {
            let minutes: f64 = captures[1].parse().ok()?;
            let secs: f64 = captures[2].parse().ok()?;
            if secs >= 60.0 {
                return None;
            }
            minutes * 60.0 + secs
        }
        None => trimmed.parse::<f64>().ok()?,
    };

    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Minimum of the valid lap fields, or `None` if no field is valid.
pub fn best_lap<S: AsRef<str>>(fields: &[S]) -> Option<f64> {
    fields
        .iter()
        .filter_map(|field| parse_lap_seconds(field.as_ref()))
        .min_by(f64::total_cmp)
}

/// Render seconds the way the board shows them (`12.345`).
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One driver's best lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    /// Best lap in seconds.
    pub time: f64,
    /// Creation marker in epoch milliseconds, unique within a board.
    #[serde(alias = "ts")]
    pub timestamp: u64,
}

impl Entry {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.time.is_finite() && self.time > 0.0
    }
}

fn by_time(a: &Entry, b: &Entry) -> Ordering {
    a.time.total_cmp(&b.time)
}

/// Editable display text shown above the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfig {
    pub event_name: String,
    pub subtitle: String,
    /// One sponsor image URL per line.
    pub sponsor_urls_text: String,
    pub show_logo: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            event_name: defaults::EVENT_NAME.to_string(),
            subtitle: defaults::SUBTITLE.to_string(),
            sponsor_urls_text: defaults::SPONSOR_URLS_TEXT.to_string(),
            show_logo: defaults::SHOW_LOGO,
        }
    }
}

impl EventConfig {
    pub fn sponsor_urls(&self) -> Vec<String> {
        rotation::parse_sponsor_urls(&self.sponsor_urls_text)
    }
}

/// What a deployment keeps in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Every accepted run is kept; the top-N view is derived.
    FullHistory,
    /// Only the top-N entries survive an insertion.
    TopOnly,
}

/// Capacity, retention and storage key of one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardVariant {
    pub capacity: usize,
    pub retention: Retention,
    pub storage_key: &'static str,
}

impl BoardVariant {
    pub const TOP_TEN: Self = Self {
        capacity: 10,
        retention: Retention::FullHistory,
        storage_key: "tradeShowState_v2",
    };

    pub const TOP_FIVE: Self = Self {
        capacity: 5,
        retention: Retention::TopOnly,
        storage_key: "tradeShowState_v1",
    };
}

// Reasons a lap sheet is turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    EmptyName,
    NoValidLaps,
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::EmptyName => write!(f, "Enter a driver name"),
            SubmissionError::NoValidLaps => write!(
                f,
                "Enter at least one lap time greater than zero (e.g. 62.345 or 1:02.345)"
            ),
        }
    }
}

impl std::error::Error for SubmissionError {}

/// The operator's unsaved form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapSheet {
    pub name: String,
    pub laps: [String; defaults::LAP_FIELDS],
}

impl LapSheet {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub entry: Entry,
    /// Zero-based position in the visible board, `None` if it missed the cut.
    pub rank: Option<usize>,
    pub new_fastest: bool,
}

/// Figures shown in the stats bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardStats {
    pub total_drivers: u64,
    pub shown: usize,
    pub fastest: Option<f64>,
    pub average_top: Option<f64>,
}

/// Ranked, capacity-bounded list of best laps.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    variant: BoardVariant,
    // FullHistory: insertion order. TopOnly: sorted by time, at most `capacity`.
    runs: Vec<Entry>,
    total_drivers: u64,
    last_timestamp: u64,
}

// The timestamp generator is not part of a board's observable state.
impl PartialEq for Leaderboard {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && self.runs == other.runs
            && self.total_drivers == other.total_drivers
    }
}

impl Leaderboard {
    pub fn new(variant: BoardVariant) -> Self {
        Self {
            variant,
            runs: Vec::new(),
            total_drivers: 0,
            last_timestamp: 0,
        }
    }

    /// Rebuild a board from stored runs, dropping entries that are not valid.
    pub fn from_parts(variant: BoardVariant, runs: Vec<Entry>, total_drivers: u64) -> Self {
        let before = runs.len();
        let mut runs: Vec<Entry> = runs
            .into_iter()
            .filter(Entry::is_valid)
            .map(|mut entry| {
                entry.name = entry.name.trim().to_string();
                entry
            })
            .collect();
        if runs.len() != before {
            debug!("Dropped {} invalid stored entries", before - runs.len());
        }

        if variant.retention == Retention::TopOnly {
            runs.sort_by(by_time);
            runs.truncate(variant.capacity);
        }

        let last_timestamp = runs.iter().map(|e| e.timestamp).max().unwrap_or(0);
        let total_drivers = total_drivers.max(runs.len() as u64);

        Self {
            variant,
            runs,
            total_drivers,
            last_timestamp,
        }
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    /// Every retained run, in storage order.
    pub fn runs(&self) -> &[Entry] {
        &self.runs
    }

    pub fn total_drivers(&self) -> u64 {
        self.total_drivers
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The visible top-N, fastest first. Equal times keep submission order.
    pub fn ranked(&self) -> Vec<&Entry> {
        let mut view: Vec<&Entry> = self.runs.iter().collect();
        if self.variant.retention == Retention::FullHistory {
            view.sort_by(|a, b| by_time(a, b));
            view.truncate(self.variant.capacity);
        }
        view
    }

    pub fn leader(&self) -> Option<&Entry> {
        // min_by keeps the first of equal minima
        self.runs.iter().min_by(|a, b| by_time(a, b))
    }

    fn rank_of(&self, timestamp: u64) -> Option<usize> {
        self.ranked().iter().position(|e| e.timestamp == timestamp)
    }

    fn next_timestamp(&mut self, now_ms: u64) -> u64 {
        let timestamp = now_ms.max(self.last_timestamp.saturating_add(1));
        self.last_timestamp = timestamp;
        timestamp
    }

    /// Record a driver's best lap from up to five lap fields.
    ///
    /// Rejected submissions leave the board untouched.
    pub fn submit<S: AsRef<str>>(
        &mut self,
        name: &str,
        laps: &[S],
        now_ms: u64,
    ) -> Result<Submission, SubmissionError> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Rejected submission without a driver name");
            return Err(SubmissionError::EmptyName);
        }
        let Some(time) = best_lap(laps) else {
            debug!("Rejected submission for '{}': no valid lap", name);
            return Err(SubmissionError::NoValidLaps);
        };

        let entry = Entry {
            name: name.to_string(),
            time,
            timestamp: self.next_timestamp(now_ms),
        };

        match self.variant.retention {
            Retention::FullHistory => self.runs.push(entry.clone()),
            Retention::TopOnly => {
                // after any equal times, so earlier submissions keep their place
                let pos = self.runs.partition_point(|e| e.time <= time);
                self.runs.insert(pos, entry.clone());
                self.runs.truncate(self.variant.capacity);
            }
        }
        self.total_drivers += 1;

        let rank = self.rank_of(entry.timestamp);
        let new_fastest = rank == Some(0);
        info!(
            "{} posted {}s (rank {:?}, total drivers {})",
            entry.name,
            format_seconds(entry.time),
            rank.map(|r| r + 1),
            self.total_drivers
        );

        Ok(Submission {
            entry,
            rank,
            new_fastest,
        })
    }

    /// Submit a lap sheet, clearing it when the submission is accepted.
    pub fn submit_sheet(
        &mut self,
        sheet: &mut LapSheet,
        now_ms: u64,
    ) -> Result<Submission, SubmissionError> {
        let submission = self.submit(&sheet.name, &sheet.laps, now_ms)?;
        sheet.clear();
        Ok(submission)
    }

    /// Clear all runs and the driver count. Does nothing unless `confirmed`.
    pub fn reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.runs.clear();
        self.total_drivers = 0;
        info!("Leaderboard reset");
        true
    }

    pub fn stats(&self) -> BoardStats {
        let top = self.ranked();
        let average_top = if top.is_empty() {
            None
        } else {
            Some(top.iter().map(|e| e.time).sum::<f64>() / top.len() as f64)
        };

        BoardStats {
            total_drivers: self.total_drivers,
            shown: top.len(),
            fastest: top.first().map(|e| e.time),
            average_top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(board: &Leaderboard) -> Vec<f64> {
        board.ranked().iter().map(|e| e.time).collect()
    }

    #[test]
    fn parses_plain_and_clock_notation() {
        assert_eq!(parse_lap_seconds("62.5"), Some(62.5));
        assert_eq!(parse_lap_seconds("  45 "), Some(45.0));
        assert_eq!(parse_lap_seconds("1:30.5"), Some(90.5));
        assert_eq!(parse_lap_seconds("0:45.25"), Some(45.25));
        assert_eq!(parse_lap_seconds("1:75.0"), None);
        assert_eq!(parse_lap_seconds("1:02.345"), Some(62.345));
    }

    #[test]
    fn clock_notation_needs_two_second_digits() {
        assert_eq!(parse_lap_seconds("1:2"), None);
        assert_eq!(parse_lap_seconds("1:2.5"), None);
        assert_eq!(parse_lap_seconds("1:002"), None);
    }

    #[test]
    fn rejects_unusable_lap_fields() {
        for field in ["", "   ", "abc", "0", "-3.2", "inf", "NaN", "-inf", "0:00"] {
            assert_eq!(parse_lap_seconds(field), None, "field {:?}", field);
        }
    }

    #[test]
    fn best_lap_ignores_invalid_fields() {
        assert_eq!(best_lap(&["13.2", "", "x", "-1", "12.9"]), Some(12.9));
        assert_eq!(best_lap(&["", "", "", "", ""]), None);
        assert_eq!(best_lap::<&str>(&[]), None);
    }

    #[test]
    fn ranks_ascending_with_stable_ties() {
        let mut board = Leaderboard::new(BoardVariant::TOP_FIVE);
        for (i, t) in ["12.345", "11.901", "13.050", "11.901"].iter().enumerate() {
            board
                .submit(&format!("Driver {}", i), &[*t], 1_000)
                .unwrap();
        }
        assert_eq!(times(&board), vec![11.901, 11.901, 12.345, 13.050]);
        let ranked = board.ranked();
        assert_eq!(ranked[0].name, "Driver 1");
        assert_eq!(ranked[1].name, "Driver 3");
    }

    #[test]
    fn full_history_keeps_every_run_but_shows_top_ten() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        for i in 0..15 {
            let lap = format!("{}", 30.0 - i as f64);
            board.submit("Driver", &[lap], 0).unwrap();
        }
        assert_eq!(board.runs().len(), 15);
        assert_eq!(board.ranked().len(), 10);
        assert_eq!(board.total_drivers(), 15);
        assert_eq!(board.ranked()[0].time, 16.0);
    }

    #[test]
    fn top_only_drops_slow_entries_but_counts_them() {
        let mut board = Leaderboard::new(BoardVariant::TOP_FIVE);
        for lap in ["10", "11", "12", "13", "14"] {
            board.submit("Fast", &[lap], 0).unwrap();
        }
        let slow = board.submit("Slow", &["20"], 0).unwrap();
        assert_eq!(slow.rank, None);
        assert!(!slow.new_fastest);
        assert_eq!(board.runs().len(), 5);
        assert_eq!(board.total_drivers(), 6);
        assert_eq!(times(&board), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn rejected_submissions_change_nothing() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        board.submit("Ana", &["40.1"], 5).unwrap();
        let before = board.clone();

        assert_eq!(
            board.submit("   ", &["39.0"], 6),
            Err(SubmissionError::EmptyName)
        );
        assert_eq!(
            board.submit("Ben", &["", "0", "-2", "fast"], 7),
            Err(SubmissionError::NoValidLaps)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn flags_only_the_new_leader() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        assert!(board.submit("Ana", &["40.0"], 1).unwrap().new_fastest);
        assert!(!board.submit("Ben", &["41.0"], 2).unwrap().new_fastest);
        // a tie does not take rank 0 from the earlier driver
        assert!(!board.submit("Cy", &["40.0"], 3).unwrap().new_fastest);
        let dee = board.submit("Dee", &["39.5", "42"], 4).unwrap();
        assert!(dee.new_fastest);
        assert_eq!(dee.rank, Some(0));
        assert_eq!(board.leader().map(|e| e.name.as_str()), Some("Dee"));
    }

    #[test]
    fn timestamps_stay_monotonic_when_clock_stalls() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        let a = board.submit("A", &["50"], 100).unwrap().entry.timestamp;
        let b = board.submit("B", &["50"], 100).unwrap().entry.timestamp;
        let c = board.submit("C", &["50"], 90).unwrap().entry.timestamp;
        assert!(a < b && b < c);
    }

    #[test]
    fn trims_driver_name() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        let sub = board.submit("  Lewis  ", &["55.1"], 0).unwrap();
        assert_eq!(sub.entry.name, "Lewis");
    }

    #[test]
    fn sheet_clears_only_on_success() {
        let mut board = Leaderboard::new(BoardVariant::TOP_TEN);
        let mut sheet = LapSheet {
            name: "Max".to_string(),
            ..LapSheet::default()
        };
        assert!(board.submit_sheet(&mut sheet, 0).is_err());
        assert_eq!(sheet.name, "Max");

        sheet.laps[2] = "48.250".to_string();
        let sub = board.submit_sheet(&mut sheet, 0).unwrap();
        assert_eq!(sub.entry.time, 48.25);
        assert_eq!(sheet, LapSheet::default());
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut board = Leaderboard::new(BoardVariant::TOP_FIVE);
        board.submit("Ana", &["40"], 0).unwrap();
        board.submit("Ben", &["41"], 0).unwrap();

        assert!(!board.reset(false));
        assert_eq!(board.runs().len(), 2);
        assert_eq!(board.total_drivers(), 2);

        assert!(board.reset(true));
        assert!(board.is_empty());
        assert_eq!(board.total_drivers(), 0);
        assert_eq!(board.stats().fastest, None);
    }

    #[test]
    fn stats_cover_visible_board() {
        let mut board = Leaderboard::new(BoardVariant::TOP_FIVE);
        assert_eq!(
            board.stats(),
            BoardStats {
                total_drivers: 0,
                shown: 0,
                fastest: None,
                average_top: None
            }
        );
        for lap in ["10", "20", "30", "40", "50", "60"] {
            board.submit("D", &[lap], 0).unwrap();
        }
        let stats = board.stats();
        assert_eq!(stats.total_drivers, 6);
        assert_eq!(stats.shown, 5);
        assert_eq!(stats.fastest, Some(10.0));
        assert_eq!(stats.average_top, Some(30.0));
    }

    #[test]
    fn from_parts_restores_invariants() {
        let runs = vec![
            Entry { name: "B".into(), time: 12.0, timestamp: 2 },
            Entry { name: " ".into(), time: 9.0, timestamp: 3 },
            Entry { name: "C".into(), time: -1.0, timestamp: 4 },
            Entry { name: "A".into(), time: 11.0, timestamp: 1 },
        ];
        let board = Leaderboard::from_parts(BoardVariant::TOP_FIVE, runs, 0);
        assert_eq!(times(&board), vec![11.0, 12.0]);
        assert_eq!(board.total_drivers(), 2);
    }

    #[test]
    fn from_parts_trims_restored_names() {
        let runs = vec![Entry { name: "  Ana  ".into(), time: 40.0, timestamp: 1 }];
        let board = Leaderboard::from_parts(BoardVariant::TOP_TEN, runs, 1);
        assert_eq!(board.runs()[0].name, "Ana");
    }

    #[test]
    fn submit_survives_maxed_out_restored_timestamp() {
        let runs = vec![Entry { name: "A".into(), time: 40.0, timestamp: u64::MAX }];
        let mut board = Leaderboard::from_parts(BoardVariant::TOP_TEN, runs, 1);
        let sub = board.submit("B", &["39.0"], 1_700_000_000_000).unwrap();
        assert_eq!(sub.entry.timestamp, u64::MAX);
        assert!(sub.new_fastest);
        assert_eq!(board.total_drivers(), 2);
    }

    #[test]
    fn formats_three_decimals() {
        assert_eq!(format_seconds(62.3456), "62.346");
        assert_eq!(format_seconds(9.0), "9.000");
    }
}

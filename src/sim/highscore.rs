/// Leaderboard persistence: top 5 scores in a plain text file.
///
/// ## File format:
///   One `INITIALS SCORE` record per line, e.g. `ZZZ 9000`.
///   Initials are 1-3 uppercase ASCII letters. Lines may be in any order;
///   they are sorted (descending, stable) on load and on insert.
///
/// A missing file is created empty. Malformed lines are skipped.
/// Saving rewrites the whole file.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MAX_ENTRIES: usize = 5;
pub const MAX_INITIALS: usize = 3;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("leaderboard I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("initials must be 1-{max} uppercase letters, got {0:?}", max = MAX_INITIALS)]
    InvalidInitials(String),
    #[error("malformed leaderboard line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}

// ══════════════════════════════════════════════════════════════
// Entries
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub initials: String,
    pub score: u32,
}

impl HighScoreEntry {
    pub fn new(initials: &str, score: u32) -> Result<Self, ScoreError> {
        if !valid_initials(initials) {
            return Err(ScoreError::InvalidInitials(initials.to_string()));
        }
        Ok(HighScoreEntry { initials: initials.to_string(), score })
    }

    /// Parse one `INITIALS SCORE` record. `line_no` is 1-based, for errors.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ScoreError> {
        let malformed = || ScoreError::Malformed { line: line_no, content: line.to_string() };
        let mut parts = line.split_whitespace();
        let (Some(initials), Some(score), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let score: u32 = score.parse().map_err(|_| malformed())?;
        if !valid_initials(initials) {
            return Err(malformed());
        }
        Ok(HighScoreEntry { initials: initials.to_string(), score })
    }
}

impl fmt::Display for HighScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.initials, self.score)
    }
}

pub fn valid_initials(s: &str) -> bool {
    (1..=MAX_INITIALS).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}

// ══════════════════════════════════════════════════════════════
// Leaderboard
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Leaderboard {
    path: PathBuf,
    entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Read the leaderboard at `path`, creating an empty file if none
    /// exists. Never fails: unreadable storage means no scores yet.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => parse_entries(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Err(e) = std::fs::write(&path, "") {
                    log::warn!("could not create {}: {e}", path.display());
                }
                Vec::new()
            }
            Err(e) => {
                log::warn!("could not read {}: {e}; starting with no scores", path.display());
                Vec::new()
            }
        };
        let mut board = Leaderboard { path, entries };
        board.sort_and_truncate();
        log::info!("loaded {} high score(s)", board.entries.len());
        board
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Would `score` make the table?
    pub fn qualifies(&self, score: u32) -> bool {
        self.entries.len() < MAX_ENTRIES
            || self.entries.last().is_some_and(|e| score > e.score)
    }

    /// Add an entry, keep the top `MAX_ENTRIES`. Returns the 1-based rank,
    /// or `None` if the entry fell off the end. Ties rank below existing
    /// entries with the same score.
    pub fn insert(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let pos = self.entries.iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        (pos < MAX_ENTRIES).then_some(pos + 1)
    }

    /// Rewrite the whole file.
    pub fn save(&self) -> Result<(), ScoreError> {
        let mut text = String::new();
        for e in &self.entries {
            text.push_str(&e.to_string());
            text.push('\n');
        }
        std::fs::write(&self.path, text)?;
        log::info!("saved {} high score(s) to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    fn sort_and_truncate(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

fn parse_entries(text: &str) -> Vec<HighScoreEntry> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match HighScoreEntry::parse(line, i + 1) {
            Ok(e) => entries.push(e),
            Err(e) => log::warn!("skipping leaderboard entry: {e}"),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ledgehop_{}_{}.txt", name, std::process::id()))
    }

    fn entry(i: &str, s: u32) -> HighScoreEntry {
        HighScoreEntry::new(i, s).unwrap()
    }

    #[test]
    fn round_trip_sorts_descending() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let mut board = Leaderboard::load(&path);
        board.insert(entry("AAA", 500));
        board.insert(entry("ZZZ", 9000));
        board.save().unwrap();

        let reloaded = Leaderboard::load(&path);
        assert_eq!(reloaded.entries(), &[entry("ZZZ", 9000), entry("AAA", 500)]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unsorted_file_is_sorted_and_truncated_on_load() {
        let path = temp_path("unsorted");
        std::fs::write(&path, "AB 10\nCCC 70\nD 40\nEEE 90\nFFF 20\nGGG 60\n").unwrap();
        let board = Leaderboard::load(&path);
        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 70, 60, 40, 20]);
        assert_eq!(board.top_score(), Some(90));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_created_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        let board = Leaderboard::load(&path);
        assert!(board.entries().is_empty());
        assert_eq!(board.top_score(), None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_path("malformed");
        std::fs::write(&path, "AAA 100\nnonsense\nBBB x\nccc 5\nTOOLONG 7\n\nCCC 50 extra\nDDD 300\n").unwrap();
        let board = Leaderboard::load(&path);
        assert_eq!(board.entries(), &[entry("DDD", 300), entry("AAA", 100)]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn insert_reports_rank_and_keeps_ties_stable() {
        let path = temp_path("ranks");
        let _ = std::fs::remove_file(&path);
        let mut board = Leaderboard::load(&path);
        assert_eq!(board.insert(entry("AAA", 100)), Some(1));
        assert_eq!(board.insert(entry("BBB", 300)), Some(1));
        assert_eq!(board.insert(entry("CCC", 100)), Some(3));
        let initials: Vec<&str> = board.entries().iter().map(|e| e.initials.as_str()).collect();
        assert_eq!(initials, vec!["BBB", "AAA", "CCC"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn full_table_drops_lowest() {
        let path = temp_path("full");
        std::fs::write(&path, "A 50\nB 40\nC 30\nD 20\nE 10\n").unwrap();
        let mut board = Leaderboard::load(&path);
        assert!(!board.qualifies(10));
        assert!(board.qualifies(11));
        assert_eq!(board.insert(entry("F", 5)), None);
        assert_eq!(board.entries().len(), MAX_ENTRIES);
        assert_eq!(board.insert(entry("G", 35)), Some(3));
        assert_eq!(board.entries().len(), MAX_ENTRIES);
        assert_eq!(board.entries().last().map(|e| e.score), Some(20));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn initials_validation() {
        assert!(HighScoreEntry::new("ABC", 1).is_ok());
        assert!(HighScoreEntry::new("A", 1).is_ok());
        assert!(matches!(HighScoreEntry::new("", 1), Err(ScoreError::InvalidInitials(_))));
        assert!(HighScoreEntry::new("ABCD", 1).is_err());
        assert!(HighScoreEntry::new("ab", 1).is_err());
        assert!(HighScoreEntry::new("A1", 1).is_err());
    }

    #[test]
    fn display_matches_file_format() {
        assert_eq!(entry("ZZZ", 9000).to_string(), "ZZZ 9000");
        assert_eq!(HighScoreEntry::parse("ZZZ 9000", 1).unwrap(), entry("ZZZ", 9000));
    }
}

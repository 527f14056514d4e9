//! Highscore and starting-level persistence
//!
//! The file holds one `key : value` pair per line:
//!
//! ```text
//! highscore : 4200
//! starting_level : 3
//! ```
//!
//! Missing or malformed values fall back to zero; unknown keys are ignored.

use crate::score::MAX_STARTING_LEVEL;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCORES_FILE: &str = "scores.txt";

/// Values carried between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedState {
    pub highscore: u64,
    pub starting_level: u32,
}

impl SavedState {
    pub fn parse(text: &str) -> Self {
        let mut state = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                tracing::warn!("Skipping malformed line {:?}", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "highscore" => state.highscore = parse_or_zero(key, value),
                "starting_level" => {
                    let level: u32 = parse_or_zero(key, value);
                    if level > MAX_STARTING_LEVEL {
                        tracing::warn!("starting_level {} too high, using 0", level);
                        state.starting_level = 0;
                    } else {
                        state.starting_level = level;
                    }
                }
                _ => tracing::debug!("Ignoring unknown key {:?}", key),
            }
        }
        state
    }

    pub fn to_text(&self) -> String {
        format!(
            "highscore : {}\nstarting_level : {}\n",
            self.highscore, self.starting_level
        )
    }

    /// Raise the highscore if `score` beats it; returns whether it did
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.highscore {
            self.highscore = score;
            true
        } else {
            false
        }
    }
}

fn parse_or_zero<T>(key: &str, value: &str) -> T
where
    T: std::str::FromStr + Default,
{
    value.parse().unwrap_or_else(|_| {
        tracing::warn!("Bad value {:?} for {}, using 0", value, key);
        T::default()
    })
}

/// Somewhere to keep [`SavedState`] between runs
pub trait Persistence {
    /// Never fails; problems are logged and defaults returned
    fn load(&self) -> SavedState;
    fn save(&self, state: &SavedState) -> anyhow::Result<()>;
}

/// File-backed store
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `dir/scores.txt`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SCORES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for ScoreStore {
    fn load(&self) -> SavedState {
        match fs::read_to_string(&self.path) {
            Ok(text) => SavedState::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No score file at {}", self.path.display());
                SavedState::default()
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", self.path.display(), e);
                SavedState::default()
            }
        }
    }

    fn save(&self, state: &SavedState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, state.to_text())
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::debug!("Saved {:?} to {}", state, self.path.display());
        Ok(())
    }
}

//! Durable high-score storage
//!
//! Scores live in a flat JSON object of string keys to string values, the
//! high score being the string-encoded integer under [`HIGH_SCORE_KEY`].

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::HIGH_SCORE_KEY;
use crate::error::Result;

/// Where the high score is read from and written to.
pub trait HighScoreStore {
    /// The stored high score, `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<u32>>;

    fn save(&mut self, score: u32) -> Result<()>;
}

/// Key-value JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<Option<u32>> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(crate::Error::Json(err)) => {
                warn!(path = %self.path.display(), %err, "score file is not a JSON object");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let Some(raw) = entries.get(HIGH_SCORE_KEY) else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(score) => Ok(Some(score)),
            Err(_) => {
                warn!(value = %raw, "ignoring unreadable high score");
                Ok(None)
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        // other keys survive; a corrupt file is replaced
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(crate::Error::Json(err)) => {
                warn!(path = %self.path.display(), %err, "replacing unreadable score file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(HIGH_SCORE_KEY.to_string(), score.to_string());
        self.write_entries(&entries)?;
        debug!(score, path = %self.path.display(), "high score written");
        Ok(())
    }
}

/// In-process store, nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    score: Option<u32>,
    writes: usize,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            score: Some(score),
            writes: 0,
        }
    }

    /// Number of successful `save` calls
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score = Some(score);
        self.writes += 1;
        Ok(())
    }
}

/// Store that reads nothing and refuses every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl HighScoreStore for FailingStore {
    fn load(&self) -> Result<Option<u32>> {
        Ok(None)
    }

    fn save(&mut self, _score: u32) -> Result<()> {
        Err(std::io::Error::new(ErrorKind::PermissionDenied, "read-only").into())
    }
}

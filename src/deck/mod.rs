//! Deck input model
//!
//! A deck is a start date plus the ordered list of schedule keywords. `DATES`
//! and `TSTEP` open new report steps; every other keyword belongs to the step
//! opened by the most recent time-advance keyword (step 0 before the first).
//!
//! Decks are exchanged as JSON:
//!
//! ```json
//! {
//!   "start": "2020-01-01T00:00:00",
//!   "keywords": [
//!     { "keyword": "WELSPECS", "records": [{ "well": "P1", "group": "G1", "head_i": 3, "head_j": 3 }] },
//!     { "keyword": "DATES", "dates": ["2020-02-01T00:00:00"] }
//!   ]
//! }
//! ```

mod records;

pub use records::*;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Deck I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Deck decode error ({}): {1}", .0.display())]
    Decode(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deck {
    pub start: NaiveDateTime,
    #[serde(default)]
    pub keywords: Vec<DeckKeyword>,
}

impl Deck {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            keywords: Vec::new(),
        }
    }

    /// Append a keyword, builder style
    pub fn with(mut self, keyword: DeckKeyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn push(&mut self, keyword: DeckKeyword) {
        self.keywords.push(keyword);
    }

    /// Load a JSON deck from disk
    pub fn load_from_file(path: &Path) -> Result<Self, DeckError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DeckError::Io(path.to_path_buf(), e))?;
        let deck: Self = serde_json::from_str(&contents)
            .map_err(|e| DeckError::Decode(path.to_path_buf(), e))?;
        info!(
            path = %path.display(),
            keywords = deck.keywords.len(),
            report_steps = deck.num_report_steps(),
            "Loaded deck"
        );
        Ok(deck)
    }

    /// Number of report steps the deck defines, counting the start as step 0
    pub fn num_report_steps(&self) -> usize {
        1 + self
            .keywords
            .iter()
            .map(|kw| match kw {
                DeckKeyword::Dates { dates } => dates.len(),
                DeckKeyword::Tstep { days } => days.len(),
                _ => 0,
            })
            .sum::<usize>()
    }
}

//! Drag gestures expressed as command-line arguments.
//!
//! Positions are 1-based and refer to the list as displayed under the chosen
//! sort order, exactly like the `#` column of the printed table. `end` names
//! the zone after the last entry.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use folio_core::{DropOutcome, DropTarget, MovePlan};
use folio_model::EntryId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("expected {expected}, got `{input}`")]
    Malformed { expected: &'static str, input: String },
    #[error("positions start at 1, got `{0}`")]
    ZeroPosition(String),
    #[error("{gesture} produced an unexpected {outcome} outcome")]
    UnexpectedOutcome {
        gesture: &'static str,
        outcome: &'static str,
    },
}

/// A displayed position or the trailing zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    At(usize),
    End,
}

impl Position {
    /// Drop target in a view of `view_len` entries.
    pub fn target(self, view_len: usize) -> DropTarget {
        match self {
            Self::At(position) => DropTarget::from_view_index(position - 1, view_len),
            Self::End => DropTarget::End,
        }
    }
}

impl FromStr for Position {
    type Err = PlanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("end") {
            return Ok(Self::End);
        }
        parse_index(trimmed).map(Self::At)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(position) => write!(f, "{position}"),
            Self::End => f.write_str("end"),
        }
    }
}

fn parse_index(input: &str) -> Result<usize, PlanError> {
    let position: usize = input.parse().map_err(|_| PlanError::Malformed {
        expected: "a position or `end`",
        input: input.to_string(),
    })?;
    if position == 0 {
        return Err(PlanError::ZeroPosition(input.to_string()));
    }
    Ok(position)
}

/// `--move FROM:TO`: drag the entry shown at `from` onto `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub from: usize,
    pub to: Position,
}

impl FromStr for MoveSpec {
    type Err = PlanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (from, to) = input.split_once(':').ok_or_else(|| PlanError::Malformed {
            expected: "FROM:TO",
            input: input.to_string(),
        })?;
        Ok(Self {
            from: parse_index(from.trim())?,
            to: to.parse()?,
        })
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

/// `--insert AT:FILE`: drop an outside file in front of the entry shown at
/// `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertSpec {
    pub at: Position,
    pub source: PathBuf,
}

impl FromStr for InsertSpec {
    type Err = PlanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || PlanError::Malformed {
            expected: "AT:FILE",
            input: input.to_string(),
        };
        let (at, source) = input.split_once(':').ok_or_else(malformed)?;
        if source.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            at: at.parse()?,
            source: PathBuf::from(source),
        })
    }
}

/// The move a `--move` drop performed, or `None` when the order was kept.
pub fn moved(outcome: DropOutcome) -> Result<Option<MovePlan>, PlanError> {
    match outcome {
        DropOutcome::Moved(plan) => Ok(Some(plan)),
        DropOutcome::Unchanged => Ok(None),
        DropOutcome::Inserted(_) => Err(PlanError::UnexpectedOutcome {
            gesture: "--move",
            outcome: "insert",
        }),
    }
}

/// Entries an `--insert` drop admitted; empty when the file was skipped.
pub fn inserted(outcome: DropOutcome) -> Result<Vec<EntryId>, PlanError> {
    match outcome {
        DropOutcome::Inserted(ids) => Ok(ids),
        DropOutcome::Unchanged => Ok(Vec::new()),
        DropOutcome::Moved(_) => Err(PlanError::UnexpectedOutcome {
            gesture: "--insert",
            outcome: "move",
        }),
    }
}

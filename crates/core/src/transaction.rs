//! Grade-mark transactions recorded on the ledger.

use crate::hash::{hash, Hash};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mark awarded by the coinbase record of a genesis block.
pub const COINBASE_MARK: f64 = 6.25;

/// Errors raised when a transaction fails basic validation.
#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("student code must not be empty")]
    EmptyStudentCode,

    #[error("subject code must not be empty")]
    EmptySubjectCode,

    #[error("mark must be a finite, non-negative number (got {0})")]
    InvalidMark(f64),
}

/// A single grade-mark record.
///
/// Fields are fixed at construction. The hash is a pure function of the
/// fields and their order, see [`Transaction::canonical_string`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    student_code: String,
    subject_code: String,
    mark: f64,
    timestamp: DateTime<Utc>,
    n_mark: u32,
}

impl Transaction {
    /// Create a new transaction. The timestamp is truncated to milliseconds.
    pub fn new(
        student_code: impl Into<String>,
        subject_code: impl Into<String>,
        mark: f64,
        timestamp: DateTime<Utc>,
        n_mark: u32,
    ) -> Self {
        Self {
            student_code: student_code.into(),
            subject_code: subject_code.into(),
            mark,
            timestamp: timestamp.trunc_subsecs(3),
            n_mark,
        }
    }

    /// The reward record placed in a genesis block.
    pub fn coinbase(miner: impl Into<String>) -> Self {
        Self::new(miner, "", COINBASE_MARK, Utc::now(), 0)
    }

    pub fn student_code(&self) -> &str {
        &self.student_code
    }

    pub fn subject_code(&self) -> &str {
        &self.subject_code
    }

    pub fn mark(&self) -> f64 {
        self.mark
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Ordinal of this mark within the subject.
    pub fn n_mark(&self) -> u32 {
        self.n_mark
    }

    /// Stable field-level serialization:
    /// `len:student|len:subject|mark|timestamp|n_mark`, timestamp in ISO-8601
    /// with milliseconds. Text fields carry their byte length so a `|` inside
    /// a code cannot shift a field boundary.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}:{}|{}:{}|{}|{}|{}",
            self.student_code.len(),
            self.student_code,
            self.subject_code.len(),
            self.subject_code,
            self.mark,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.n_mark
        )
    }

    /// Leaf hash of this transaction.
    pub fn hash(&self) -> Hash {
        hash(self.canonical_string().as_bytes())
    }

    /// Basic field validation.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.student_code.trim().is_empty() {
            return Err(TransactionError::EmptyStudentCode);
        }
        if self.subject_code.trim().is_empty() {
            return Err(TransactionError::EmptySubjectCode);
        }
        if !self.mark.is_finite() || self.mark < 0.0 {
            return Err(TransactionError::InvalidMark(self.mark));
        }
        Ok(())
    }
}

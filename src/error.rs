// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Errors raised by the ledger core.
//!
//! Absence (a missing category, an empty chat) and duplicate category names
//! are not errors: those surface as `None` or empty collections. Only
//! malformed input, totals too large to represent and storage faults end up
//! here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Input rejected before anything was written.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// A stored value could not be decoded back into its model type.
    #[error("Corrupt value in column '{column}': {value}")]
    Decode { column: String, value: String },
    /// A running total or ratio left the range `Decimal` can represent.
    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

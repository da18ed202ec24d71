// SPDX-License-Identifier: Apache-2.0

//! Error types for APDU parsing and construction

use core::fmt;

use thiserror::Error;

/// Part of a command APDU that ran out of bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApduField {
    /// The four mandatory header bytes (CLA INS P1 P2)
    Header,
    /// The command data announced by Lc
    Data,
}

impl fmt::Display for ApduField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApduField::Header => f.write_str("header"),
            ApduField::Data => f.write_str("data field"),
        }
    }
}

/// Errors produced while parsing or constructing APDUs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApduError {
    /// A required argument was missing or out of range
    #[error("Invalid arguments: {0}")]
    InvalidArguments(&'static str),

    /// Fewer bytes than the header or the declared Lc requires
    #[error("APDU too short in {field} (need {missing} bytes)")]
    DataTooShort { field: ApduField, missing: usize },

    /// Trailing bytes after a complete case 3 or case 4 APDU
    #[error("APDU too long ({extra} bytes extra)")]
    DataTooLong { extra: usize },

    /// Response shorter than the two status bytes
    #[error("Response too short: {0} bytes (expected at least 2)")]
    ResponseTooShort(usize),
}

impl ApduError {
    /// Number of bytes missing, for `DataTooShort`
    pub fn missing(&self) -> Option<usize> {
        match self {
            ApduError::DataTooShort { missing, .. } => Some(*missing),
            _ => None,
        }
    }

    /// Number of surplus bytes, for `DataTooLong`
    pub fn extra(&self) -> Option<usize> {
        match self {
            ApduError::DataTooLong { extra } => Some(*extra),
            _ => None,
        }
    }
}

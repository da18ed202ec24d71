// SPDX-License-Identifier: Apache-2.0

use ccid_apdu::ApduError;
use thiserror::Error;

/// Errors raised while setting up a card context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContextError<E: std::error::Error> {
    /// Error from the underlying middleware
    #[error("Context error: {0}")]
    Backend(#[from] E),

    /// The context knows no readers at all
    #[error("No readers found")]
    NoReadersFound,

    /// Requested reader index is out of range
    #[error("Reader {index} not found ({count} readers available)")]
    ReaderNotFound { index: usize, count: usize },

    /// Requested card driver is not configured
    #[error("Card driver '{0}' not found")]
    CardDriverNotFound(String),
}

/// Errors raised while transmitting an APDU
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransmitError<E: std::error::Error> {
    /// Error from the exchange itself
    #[error("Exchange error: {0}")]
    Exchange(#[source] E),

    /// The card kept answering 61 xx
    #[error("GET RESPONSE chain exceeded {0} rounds")]
    ResponseChainTooLong(usize),

    /// Follow-up command could not be built
    #[error("APDU error: {0}")]
    Apdu(#[from] ApduError),
}

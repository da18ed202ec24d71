// SPDX-License-Identifier: Apache-2.0

//! Card reader context and APDU exchange abstraction
//!
//! A [`CardContext`] wraps the smart-card middleware: it enumerates readers and
//! card drivers and connects to cards. Connected cards implement [`Exchange`];
//! [`Transmit`] adds the GET RESPONSE and wrong-length follow-ups that the
//! APDU flags allow.

mod context;
mod errors;
pub mod mock;
mod transmit;

pub use async_trait::async_trait;
pub use ccid_apdu::{Apdu, ApduCase, ApduError, ApduFlags, ResponseApdu};
pub use context::{
    find_card_driver, initialize, CardContext, CardDriver, ReaderConfig, ReaderDriver, ReaderInfo,
};
pub use errors::{ContextError, TransmitError};
pub use transmit::{Transmit, MAX_GET_RESPONSE_ROUNDS};

/// Use to talk to a card
#[async_trait]
pub trait Exchange {
    /// Error defined by Transport used
    type Error: std::error::Error + Send;

    /// Send a single command and retrieve the raw answer or a transport error
    async fn exchange(&self, command: &Apdu<'_>) -> Result<ResponseApdu, Self::Error>;
}

use ccid_transport::ApduError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcscTransportError {
    /// PC/SC error
    #[error("PC/SC: {0}")]
    Pcsc(#[from] pcsc::Error),
    /// Communication error
    #[error("PC/SC: communication error `{0}`")]
    Comm(&'static str),
    /// Malformed answer from the card
    #[error("PC/SC: invalid answer: {0}")]
    Apdu(#[from] ApduError),
    /// Reader index out of range
    #[error("PC/SC: no reader at index {0}")]
    NoSuchReader(usize),
    /// Reader name is not valid UTF-8
    #[error("PC/SC: UTF8 error in reader name")]
    UTF8(#[from] std::str::Utf8Error),
}

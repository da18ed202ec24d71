// SPDX-License-Identifier: Apache-2.0

//! Response APDU

use core::fmt;

use crate::errors::ApduError;

/// Response APDU: payload followed by the SW1 SW2 status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseApdu {
    /// Response data (without status word)
    pub data: Vec<u8>,
    /// Status word SW1
    pub sw1: u8,
    /// Status word SW2
    pub sw2: u8,
}

impl ResponseApdu {
    /// Split a raw answer into payload and status word
    pub fn from_answer(mut answer: Vec<u8>) -> Result<Self, ApduError> {
        if answer.len() < 2 {
            return Err(ApduError::ResponseTooShort(answer.len()));
        }

        let sw2 = answer.pop().unwrap_or_default();
        let sw1 = answer.pop().unwrap_or_default();

        Ok(Self {
            data: answer,
            sw1,
            sw2,
        })
    }

    /// Check if the response indicates success (9000)
    pub fn is_success(&self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Full status word as a 16-bit value
    pub fn status_word(&self) -> u16 {
        u16::from_be_bytes([self.sw1, self.sw2])
    }

    /// Payload and status word, as received on the wire
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.data.clone();
        bytes.push(self.sw1);
        bytes.push(self.sw2);
        bytes
    }
}

impl fmt::Display for ResponseApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.data.is_empty() {
            write!(f, "{} ", hex::encode_upper(&self.data))?;
        }
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_status_word() {
        let resp = ResponseApdu::from_answer(vec![0x6F, 0x00, 0x90, 0x00]).unwrap();

        assert_eq!(resp.data, vec![0x6F, 0x00]);
        assert!(resp.is_success());
        assert_eq!(resp.status_word(), 0x9000);
        assert_eq!(resp.to_string(), "6F00 9000");
    }

    #[test]
    fn status_only() {
        let resp = ResponseApdu::from_answer(vec![0x6A, 0x82]).unwrap();

        assert!(resp.data.is_empty());
        assert!(!resp.is_success());
        assert_eq!(resp.to_string(), "6A82");
        assert_eq!(resp.to_bytes(), vec![0x6A, 0x82]);
    }

    #[test]
    fn rejects_short_answer() {
        assert_eq!(
            ResponseApdu::from_answer(vec![0x90]),
            Err(ApduError::ResponseTooShort(1))
        );
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Command APDU types

use core::fmt;

use bitflags::bitflags;

use crate::errors::ApduError;

/// Largest command data field in short form
pub const MAX_SHORT_DATA_LEN: usize = 255;
/// Largest expected response length in short form (encoded as 0x00)
pub const MAX_SHORT_LE: u16 = 256;

/// ISO/IEC 7816-4 structural case of a short-form command APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApduCase {
    /// No command data, no expected response length
    Case1,
    /// Expected response length only
    Case2Short,
    /// Command data only
    Case3Short,
    /// Command data and expected response length
    Case4Short,
}

impl ApduCase {
    fn from_fields(has_data: bool, has_le: bool) -> Self {
        match (has_data, has_le) {
            (false, false) => ApduCase::Case1,
            (false, true) => ApduCase::Case2Short,
            (true, false) => ApduCase::Case3Short,
            (true, true) => ApduCase::Case4Short,
        }
    }
}

impl fmt::Display for ApduCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApduCase::Case1 => "case 1",
            ApduCase::Case2Short => "case 2 short",
            ApduCase::Case3Short => "case 3 short",
            ApduCase::Case4Short => "case 4 short",
        })
    }
}

bitflags! {
    /// Hints for the transport layer about automatic follow-up exchanges
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApduFlags: u32 {
        /// Do not chain GET RESPONSE on SW1 = 0x61
        const NO_GET_RESPONSE = 0x0001;
        /// Do not resend with the corrected Le on SW1 = 0x6C
        const NO_RETRY_WRONG_LENGTH = 0x0002;
    }
}

impl ApduFlags {
    /// Flags attached to every APDU parsed from raw bytes
    pub const RAW: ApduFlags = ApduFlags::NO_GET_RESPONSE.union(ApduFlags::NO_RETRY_WRONG_LENGTH);
}

/// Short-form command APDU.
///
/// `data` borrows from the buffer the APDU was parsed from (or the slice given
/// to [`Apdu::with_data`]); copy it out with [`Apdu::serialize`] when the APDU
/// must outlive that buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu<'a> {
    pub(crate) cla: u8,
    pub(crate) ins: u8,
    pub(crate) p1: u8,
    pub(crate) p2: u8,
    pub(crate) lc: Option<u8>,
    pub(crate) data: &'a [u8],
    pub(crate) le: Option<u16>,
    pub(crate) case: ApduCase,
    pub(crate) flags: ApduFlags,
}

impl<'a> Apdu<'a> {
    /// Create a case 1 APDU with no flags set
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            lc: None,
            data: &[],
            le: None,
            case: ApduCase::Case1,
            flags: ApduFlags::empty(),
        }
    }

    /// Attach command data (at most 255 bytes)
    pub fn with_data(mut self, data: &'a [u8]) -> Result<Self, ApduError> {
        if data.is_empty() {
            return Err(ApduError::InvalidArguments("command data must not be empty"));
        }
        if data.len() > MAX_SHORT_DATA_LEN {
            return Err(ApduError::InvalidArguments("command data exceeds 255 bytes"));
        }
        self.lc = Some(data.len() as u8);
        self.data = data;
        self.case = ApduCase::from_fields(true, self.le.is_some());
        Ok(self)
    }

    /// Set the expected response length (1..=256)
    pub fn with_le(mut self, le: u16) -> Result<Self, ApduError> {
        if le == 0 || le > MAX_SHORT_LE {
            return Err(ApduError::InvalidArguments("expected length must be within 1..=256"));
        }
        self.le = Some(le);
        self.case = ApduCase::from_fields(self.lc.is_some(), true);
        Ok(self)
    }

    /// Replace the transport flags
    pub fn with_flags(mut self, flags: ApduFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn cla(&self) -> u8 {
        self.cla
    }

    pub fn ins(&self) -> u8 {
        self.ins
    }

    pub fn p1(&self) -> u8 {
        self.p1
    }

    pub fn p2(&self) -> u8 {
        self.p2
    }

    /// Length of the command data, when present
    pub fn lc(&self) -> Option<u8> {
        self.lc
    }

    /// Command data, empty for cases 1 and 2
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Expected response length; 256 stands for the 0x00 encoding
    pub fn le(&self) -> Option<u16> {
        self.le
    }

    pub fn case(&self) -> ApduCase {
        self.case
    }

    pub fn flags(&self) -> ApduFlags {
        self.flags
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        4 + self.lc.map_or(0, |lc| 1 + lc as usize) + usize::from(self.le.is_some())
    }

    /// Always false: the header is mandatory
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Short-form wire encoding
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&[self.cla, self.ins, self.p1, self.p2]);

        if let Some(lc) = self.lc {
            bytes.push(lc);
            bytes.extend_from_slice(self.data);
        }

        if let Some(le) = self.le {
            // 256 wraps to 0x00
            bytes.push(le as u8);
        }

        bytes
    }
}

impl fmt::Display for Apdu<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.serialize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_case_4_command() {
        let aid = [0xA0, 0x00, 0x00, 0x00, 0x03];
        let apdu = Apdu::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(&aid)
            .unwrap()
            .with_le(256)
            .unwrap();

        assert_eq!(apdu.case(), ApduCase::Case4Short);
        assert_eq!(apdu.lc(), Some(5));
        assert_eq!(apdu.len(), 11);
        assert_eq!(
            apdu.serialize(),
            vec![0x00, 0xA4, 0x04, 0x00, 0x05, 0xA0, 0x00, 0x00, 0x00, 0x03, 0x00]
        );
        assert!(apdu.flags().is_empty());
    }

    #[test]
    fn case_follows_fields() {
        let apdu = Apdu::new(0x80, 0xCA, 0x9F, 0x36);
        assert_eq!(apdu.case(), ApduCase::Case1);

        let apdu = apdu.with_le(2).unwrap();
        assert_eq!(apdu.case(), ApduCase::Case2Short);
        assert_eq!(apdu.serialize(), vec![0x80, 0xCA, 0x9F, 0x36, 0x02]);

        let apdu = Apdu::new(0x00, 0x20, 0x00, 0x81)
            .with_data(b"123456")
            .unwrap();
        assert_eq!(apdu.case(), ApduCase::Case3Short);
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        let big = [0u8; 256];
        assert!(matches!(
            Apdu::new(0, 0, 0, 0).with_data(&big),
            Err(ApduError::InvalidArguments(_))
        ));
        assert!(matches!(
            Apdu::new(0, 0, 0, 0).with_data(&[]),
            Err(ApduError::InvalidArguments(_))
        ));
        assert!(Apdu::new(0, 0, 0, 0).with_le(0).is_err());
        assert!(Apdu::new(0, 0, 0, 0).with_le(257).is_err());
    }

    #[test]
    fn raw_flags_disable_chaining() {
        assert!(ApduFlags::RAW.contains(ApduFlags::NO_GET_RESPONSE));
        assert!(ApduFlags::RAW.contains(ApduFlags::NO_RETRY_WRONG_LENGTH));
    }

    #[test]
    fn displays_as_hex() {
        let apdu = Apdu::new(0x00, 0xB0, 0x00, 0x00).with_le(0x10).unwrap();
        assert_eq!(apdu.to_string(), "00B0000010");
    }
}

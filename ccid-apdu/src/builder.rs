// SPDX-License-Identifier: Apache-2.0

//! Command APDU parsing from raw bytes (short form only)

use crate::command::{Apdu, ApduCase, ApduFlags};
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::errors::{ApduError, ApduField};

const HEADER_LEN: usize = 4;

/// Short-form Le: 0x00 means 256
fn normalize_le(byte: u8) -> u16 {
    if byte == 0 {
        256
    } else {
        byte as u16
    }
}

/// Parse `buf` as a single short-form command APDU.
///
/// The whole buffer must be consumed: a short data field or trailing bytes are
/// errors. The returned APDU borrows its data field from `buf` and carries
/// [`ApduFlags::RAW`].
pub fn build_apdu<'a, D>(diag: &D, buf: &'a [u8]) -> Result<Apdu<'a>, ApduError>
where
    D: Diagnostics + ?Sized,
{
    let len0 = buf.len();
    if len0 < HEADER_LEN {
        diag.error(format_args!("APDU too short (must be at least 4 bytes)"));
        return Err(ApduError::DataTooShort {
            field: ApduField::Header,
            missing: HEADER_LEN - len0,
        });
    }

    let (header, mut rest) = buf.split_at(HEADER_LEN);
    let mut apdu = Apdu::new(header[0], header[1], header[2], header[3]);

    // remaining > 1 must be ruled out before remaining == 1
    if rest.len() > 1 {
        let lc = rest[0];
        rest = &rest[1..];

        if rest.len() < lc as usize {
            let missing = lc as usize - rest.len();
            diag.error(format_args!("APDU too short (need {} bytes)", missing));
            return Err(ApduError::DataTooShort {
                field: ApduField::Data,
                missing,
            });
        }

        let (data, tail) = rest.split_at(lc as usize);
        apdu.lc = Some(lc);
        apdu.data = data;

        match tail {
            [] => apdu.case = ApduCase::Case3Short,
            [le] => {
                apdu.le = Some(normalize_le(*le));
                apdu.case = ApduCase::Case4Short;
            }
            [_, extra @ ..] => {
                diag.error(format_args!("APDU too long ({} bytes extra)", extra.len()));
                return Err(ApduError::DataTooLong { extra: extra.len() });
            }
        }
    } else if let [le] = rest {
        apdu.le = Some(normalize_le(*le));
        apdu.case = ApduCase::Case2Short;
    }

    apdu.flags = ApduFlags::RAW;

    diag.verbose(format_args!(
        "APDU, {} bytes:\tins={:02x} p1={:02x} p2={:02x}",
        len0, apdu.ins, apdu.p1, apdu.p2
    ));

    Ok(apdu)
}

impl<'a> Apdu<'a> {
    /// Parse raw bytes, reporting diagnostics through the `log` facade
    pub fn parse(buf: &'a [u8]) -> Result<Self, ApduError> {
        build_apdu(&LogDiagnostics, buf)
    }
}

impl<'a> TryFrom<&'a [u8]> for Apdu<'a> {
    type Error = ApduError;

    fn try_from(buf: &'a [u8]) -> Result<Self, Self::Error> {
        Apdu::parse(buf)
    }
}

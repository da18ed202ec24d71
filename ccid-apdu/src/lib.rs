// SPDX-License-Identifier: Apache-2.0

//! ISO/IEC 7816-4 command APDUs
//!
//! Parses a raw byte buffer into a short-form command APDU and classifies its
//! case (1, 2, 3 or 4). Parsed APDUs borrow their data field from the input
//! buffer and carry flags telling the transport not to chain GET RESPONSE or
//! retry on wrong Le.
//!
//! ```
//! use ccid_apdu::{Apdu, ApduCase};
//!
//! let raw = [0x00, 0xA4, 0x04, 0x00, 0x02, 0x3F, 0x00];
//! let apdu = Apdu::parse(&raw).unwrap();
//! assert_eq!(apdu.case(), ApduCase::Case3Short);
//! assert_eq!(apdu.data(), &[0x3F, 0x00]);
//! ```

mod builder;
mod command;
mod diagnostics;
mod errors;
mod response;

pub use builder::build_apdu;
pub use command::{Apdu, ApduCase, ApduFlags, MAX_SHORT_DATA_LEN, MAX_SHORT_LE};
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use errors::{ApduError, ApduField};
pub use response::ResponseApdu;

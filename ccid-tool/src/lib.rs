// SPDX-License-Identifier: Apache-2.0

//! Command-line glue for the ccid tools
//!
//! Option table with getopt-style usage text, parse-error reporting, reader
//! and driver listing, and a session sending command line APDUs to a card.

pub mod avail;
pub mod options;
pub mod session;
pub mod usage;

pub use options::{CliError, Options, APP_NAME, OPTIONS};
pub use session::{describe_apdu, parse_only, run, SessionError};
pub use usage::{format_parse_error, format_usage, parse_error, print_usage, CliOption, HasArg};

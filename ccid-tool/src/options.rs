// SPDX-License-Identifier: Apache-2.0

//! Command-line options of `ccid-tool`

use std::ffi::OsString;

use ccid_transport::ReaderConfig;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;

use crate::usage::{CliOption, HasArg};

pub const APP_NAME: &str = "ccid-tool";

pub const OPTIONS: &[CliOption] = &[
    CliOption {
        name: "reader",
        short: Some('r'),
        has_arg: HasArg::Required,
        help: Some("Number of the reader to use (default: first with a card)"),
    },
    CliOption {
        name: "card-driver",
        short: Some('c'),
        has_arg: HasArg::Required,
        help: Some("Which card driver to use"),
    },
    CliOption {
        name: "apdu",
        short: Some('a'),
        has_arg: HasArg::Required,
        help: Some("Hex encoded command APDU to send (repeatable)"),
    },
    CliOption {
        name: "info",
        short: Some('i'),
        has_arg: HasArg::No,
        help: Some("Print available readers and drivers"),
    },
    CliOption {
        name: "verbose",
        short: Some('v'),
        has_arg: HasArg::No,
        help: Some("Use (several times) to be more verbose"),
    },
    CliOption {
        name: "help",
        short: Some('h'),
        has_arg: HasArg::No,
        help: Some("Print help and exit"),
    },
    CliOption {
        name: "parse-only",
        short: None,
        has_arg: HasArg::No,
        help: None,
    },
    CliOption {
        name: "wait-card",
        short: None,
        has_arg: HasArg::No,
        help: None,
    },
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    /// `--help` was given
    #[error("help requested")]
    Help,

    /// An option value could not be parsed
    #[error("Could not parse {option} ('{value}')")]
    Parse { option: &'static str, value: String },

    /// Rejected by the argument parser (unknown option, missing value, ...)
    #[error("Invalid arguments: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub reader: ReaderConfig,
    /// Raw command APDUs, in command-line order
    pub apdus: Vec<Vec<u8>>,
    pub info: bool,
    pub verbose: u8,
    /// Classify the APDUs without touching a reader
    pub parse_only: bool,
    /// Block until a card is inserted in the selected reader
    pub wait_card: bool,
}

impl Options {
    /// Parse `args`, the first item being the program name
    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command()
            .try_get_matches_from(args)
            .map_err(|err| CliError::Invalid(describe_clap_error(&err)))?;

        if flag(&matches, "help") > 0 {
            return Err(CliError::Help);
        }

        let reader = match last_value(&matches, "reader") {
            Some(value) => Some(value.parse::<usize>().map_err(|_| CliError::Parse {
                option: "reader",
                value: value.to_string(),
            })?),
            None => None,
        };

        let apdus = matches
            .get_many::<String>("apdu")
            .into_iter()
            .flatten()
            .map(|value| {
                parse_hex(value).ok_or_else(|| CliError::Parse {
                    option: "apdu",
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Options {
            reader: ReaderConfig {
                reader,
                card_driver: last_value(&matches, "card-driver").map(str::to_string),
            },
            apdus,
            info: flag(&matches, "info") > 0,
            verbose: flag(&matches, "verbose"),
            parse_only: flag(&matches, "parse-only") > 0,
            wait_card: flag(&matches, "wait-card") > 0,
        })
    }

    /// Default `env_logger` filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// clap command mirroring [`OPTIONS`]; help and version are handled by us
fn command() -> Command {
    let args = OPTIONS.iter().map(|option| {
        let mut arg = Arg::new(option.name)
            .long(option.name)
            .hide(option.help.is_none());
        if let Some(short) = option.short {
            arg = arg.short(short);
        }
        match option.has_arg {
            HasArg::No => arg.action(ArgAction::Count),
            HasArg::Required => arg.action(ArgAction::Append).num_args(1),
            HasArg::Optional => arg
                .action(ArgAction::Append)
                .num_args(0..=1)
                .default_missing_value(""),
        }
    });

    Command::new(APP_NAME)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args(args)
}

fn flag(matches: &ArgMatches, name: &str) -> u8 {
    matches.get_count(name)
}

/// Later occurrences override earlier ones, like getopt loops do
fn last_value<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches
        .get_many::<String>(name)
        .and_then(|values| values.last())
        .map(String::as_str)
}

fn describe_clap_error(err: &clap::Error) -> String {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => match err.kind() {
            ErrorKind::UnknownArgument => format!("unknown option '{}'", arg),
            _ => format!("missing or invalid value for '{}'", arg),
        },
        _ => err.kind().as_str().unwrap_or("invalid arguments").to_string(),
    }
}

/// Decode hex, ignoring spaces and colons between bytes
pub fn parse_hex(input: &str) -> Option<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.is_empty() {
        return None;
    }
    hex::decode(digits).ok()
}

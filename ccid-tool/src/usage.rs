// SPDX-License-Identifier: Apache-2.0

//! Usage text and option parse errors

/// Whether an option takes an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasArg {
    No,
    Required,
    Optional,
}

impl HasArg {
    fn placeholder(self) -> &'static str {
        match self {
            HasArg::No => "",
            HasArg::Required => " <arg>",
            HasArg::Optional => " [arg]",
        }
    }
}

/// One entry of an option table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOption {
    /// Long name, without the leading dashes
    pub name: &'static str,
    pub short: Option<char>,
    pub has_arg: HasArg,
    /// Help text; `None` hides the option from the usage
    pub help: Option<&'static str>,
}

/// Usage text for `app` listing every visible option of `options`
pub fn format_usage(app: &str, options: &[CliOption]) -> String {
    let mut usage = format!("Usage: {} [OPTIONS]\nOptions:\n", app);

    for option in options {
        let Some(help) = option.help else {
            continue;
        };

        let short = option
            .short
            .filter(|c| c.is_ascii() && *c != '\0')
            .map(|c| format!("-{}", c))
            .unwrap_or_default();

        let mut column = format!(
            "--{:<13}{}{}",
            option.name,
            short,
            option.has_arg.placeholder()
        );
        // too wide for the column: own line, help below
        if column.len() > 24 {
            usage.push_str(&format!("  {}\n", column));
            column.clear();
        }
        usage.push_str(&format!("  {:<24} {}\n", column, help));
    }

    usage
}

pub fn print_usage(app: &str, options: &[CliOption]) {
    print!("{}", format_usage(app, options));
}

/// Report that `value` could not be parsed for option `name`, then the usage
pub fn format_parse_error(app: &str, options: &[CliOption], name: &str, value: &str) -> String {
    format!(
        "Could not parse {} ('{}').\n{}",
        name,
        value,
        format_usage(app, options)
    )
}

pub fn parse_error(app: &str, options: &[CliOption], name: &str, value: &str) {
    print!("{}", format_parse_error(app, options, name, value));
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[CliOption] = &[
        CliOption {
            name: "reader",
            short: Some('r'),
            has_arg: HasArg::Required,
            help: Some("Number of the reader to use"),
        },
        CliOption {
            name: "secret",
            short: Some('s'),
            has_arg: HasArg::No,
            help: None,
        },
        CliOption {
            name: "verbose",
            short: Some('v'),
            has_arg: HasArg::No,
            help: Some("Use (several times) to be more verbose"),
        },
        CliOption {
            name: "level",
            short: None,
            has_arg: HasArg::Optional,
            help: Some("Optional level"),
        },
        CliOption {
            name: "a-rather-long-option",
            short: Some('L'),
            has_arg: HasArg::Required,
            help: Some("Wrapped"),
        },
    ];

    #[test]
    fn test_usage_layout() {
        let expected = "\
Usage: tool [OPTIONS]
Options:
  --reader       -r <arg>  Number of the reader to use
  --verbose      -v        Use (several times) to be more verbose
  --level         [arg]    Optional level
  --a-rather-long-option-L <arg>
                           Wrapped
";
        assert_eq!(format_usage("tool", TABLE), expected);
    }

    #[test]
    fn test_hidden_options_are_skipped() {
        let usage = format_usage("tool", TABLE);
        assert!(!usage.contains("secret"));
    }

    #[test]
    fn test_non_ascii_short_is_omitted() {
        let table = [CliOption {
            name: "euro",
            short: Some('€'),
            has_arg: HasArg::No,
            help: Some("Currency"),
        }];
        assert_eq!(
            format_usage("t", &table),
            "Usage: t [OPTIONS]\nOptions:\n  --euro                   Currency\n"
        );
    }

    #[test]
    fn test_parse_error() {
        let message = format_parse_error("tool", TABLE, "reader", "abc");
        assert!(message.starts_with("Could not parse reader ('abc').\nUsage: tool [OPTIONS]\n"));
    }
}

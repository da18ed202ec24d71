// SPDX-License-Identifier: Apache-2.0

//! Send command APDUs to a smart card from the command line
//!
//! ```text
//! ccid-tool --info
//! ccid-tool -r 0 -a 00A4040C023F00 -a 00B0000000
//! RUST_LOG=trace ccid-tool -a 00A4040000
//! ```

use std::error::Error;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process;

use ccid_tool::{parse_error, parse_only, print_usage, CliError, Options, APP_NAME, OPTIONS};

fn app_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| APP_NAME.to_string())
}

fn init_logging(options: &Options) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(options.log_level()))
        .init();
}

#[cfg(feature = "pcsc")]
async fn run_with_backend(options: &Options) -> Result<(), Box<dyn Error>> {
    use ccid_transport_pcsc::PcscContext;

    let mut ctx = match PcscContext::establish() {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("Failed to establish context: {}", err);
            process::exit(1);
        }
    };

    ccid_tool::run(&mut ctx, options, &mut io::stdout().lock()).await?;
    Ok(())
}

#[cfg(not(feature = "pcsc"))]
async fn run_with_backend(_options: &Options) -> Result<(), Box<dyn Error>> {
    eprintln!("Failed to establish context: built without a reader backend (enable the `pcsc` feature)");
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let app = app_name(&args);

    let options = match Options::parse_from(&args) {
        Ok(options) => options,
        Err(CliError::Help) => {
            print_usage(&app, OPTIONS);
            return Ok(());
        }
        Err(CliError::Parse { option, value }) => {
            parse_error(&app, OPTIONS, option, &value);
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{}", err);
            print_usage(&app, OPTIONS);
            process::exit(1);
        }
    };

    init_logging(&options);

    if options.parse_only {
        parse_only(&options, &mut io::stdout().lock())?;
        return Ok(());
    }

    run_with_backend(&options).await
}

// SPDX-License-Identifier: Apache-2.0

//! Diagnostic sink injected into the APDU builder

use core::fmt;

/// Receives builder diagnostics at two severities.
///
/// Parsing never depends on a sink succeeding; implementations may drop
/// messages.
pub trait Diagnostics {
    /// Verbose/trace message
    fn verbose(&self, args: fmt::Arguments<'_>);

    /// Error message
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Forwards diagnostics to the `log` facade (`debug!` and `error!`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn verbose(&self, args: fmt::Arguments<'_>) {
        log::debug!("{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        log::error!("{}", args);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn verbose(&self, args: fmt::Arguments<'_>) {
        (**self).verbose(args)
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        (**self).error(args)
    }
}

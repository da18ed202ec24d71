// SPDX-License-Identifier: Apache-2.0

//! Listing of available readers and card drivers

use std::io::{self, Write};

use ccid_transport::CardContext;

pub fn write_readers<C: CardContext, W: Write>(ctx: &C, out: &mut W) -> io::Result<()> {
    let readers = ctx.readers();
    if readers.is_empty() {
        return writeln!(out, "No smart card readers found.");
    }

    writeln!(out, "Readers known about:")?;
    writeln!(out, "Nr.    Driver     Name")?;
    for (i, reader) in readers.iter().enumerate() {
        writeln!(out, "{:<7}{:<11}{}", i, reader.driver.short_name, reader.name)?;
    }
    Ok(())
}

pub fn write_drivers<C: CardContext, W: Write>(ctx: &C, out: &mut W) -> io::Result<()> {
    let drivers = ctx.card_drivers();
    if drivers.is_empty() {
        return writeln!(out, "No card drivers installed!");
    }

    writeln!(out, "Configured card drivers:")?;
    for driver in drivers {
        writeln!(out, "  {:<16} {}", driver.short_name, driver.name)?;
    }
    Ok(())
}

/// Readers, then card drivers
pub fn write_avail<C: CardContext, W: Write>(ctx: &C, out: &mut W) -> io::Result<()> {
    write_readers(ctx, out)?;
    write_drivers(ctx, out)
}

#[cfg(test)]
mod tests {
    use ccid_transport::mock::{MockContext, MockReader};
    use ccid_transport::CardDriver;

    use super::*;

    fn render(ctx: &MockContext) -> String {
        let mut out = Vec::new();
        write_avail(ctx, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_readers_and_drivers() {
        let ctx = MockContext::new(vec![
            MockReader::new("Gemalto PC Twin Reader 00 00"),
            MockReader::new("Virtual PCD 00 01").with_card(),
        ])
        .with_card_drivers(vec![
            CardDriver::new("default", "Default driver for unknown cards"),
            CardDriver::new("openpgp", "OpenPGP card"),
        ]);

        assert_eq!(
            render(&ctx),
            "Readers known about:\n\
             Nr.    Driver     Name\n\
             0      mock       Gemalto PC Twin Reader 00 00\n\
             1      mock       Virtual PCD 00 01\n\
             Configured card drivers:\n  \
             default          Default driver for unknown cards\n  \
             openpgp          OpenPGP card\n"
        );
    }

    #[test]
    fn empty_context() {
        let ctx = MockContext::new(Vec::new()).with_card_drivers(Vec::new());

        assert_eq!(
            render(&ctx),
            "No smart card readers found.\nNo card drivers installed!\n"
        );
    }
}

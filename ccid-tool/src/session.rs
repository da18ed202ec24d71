// SPDX-License-Identifier: Apache-2.0

//! Reader session: select a reader, then build and send the APDUs

use std::io::{self, Write};

use ccid_apdu::{build_apdu, Apdu, ApduError, LogDiagnostics};
use ccid_transport::{initialize, CardContext, ContextError, Exchange, Transmit, TransmitError};
use log::info;
use thiserror::Error;

use crate::avail::write_avail;
use crate::options::Options;

#[derive(Debug, Error)]
pub enum SessionError<E: std::error::Error, X: std::error::Error> {
    /// Context setup or reader selection failed
    #[error("{0}")]
    Context(#[from] ContextError<E>),

    /// Waiting for a card failed
    #[error("Failed to wait for card: {0}")]
    WaitCard(#[source] E),

    /// Could not connect to the card
    #[error("Failed to connect to card: {0}")]
    Connect(#[source] E),

    /// A command line APDU is malformed
    #[error("Invalid APDU: {0}")]
    Apdu(#[from] ApduError),

    /// Sending an APDU failed
    #[error("Failed to transmit APDU: {0}")]
    Transmit(#[from] TransmitError<X>),

    /// Output could not be written
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

pub type SessionResult<C> = Result<
    (),
    SessionError<<C as CardContext>::Error, <<C as CardContext>::Card as Exchange>::Error>,
>;

/// One-line description of a parsed APDU
pub fn describe_apdu(apdu: &Apdu<'_>) -> String {
    let lc = apdu.lc().map_or("-".to_string(), |lc| lc.to_string());
    let le = apdu.le().map_or("-".to_string(), |le| le.to_string());
    format!(
        "{}: cla={:02X} ins={:02X} p1={:02X} p2={:02X} lc={} le={} data={}",
        apdu.case(),
        apdu.cla(),
        apdu.ins(),
        apdu.p1(),
        apdu.p2(),
        lc,
        le,
        hex::encode_upper(apdu.data())
    )
}

/// Classify every APDU of `options` without a reader
pub fn parse_only<W: Write>(options: &Options, out: &mut W) -> Result<(), ParseOnlyError> {
    for raw in &options.apdus {
        let apdu = build_apdu(&LogDiagnostics, raw)?;
        writeln!(out, "{}", describe_apdu(&apdu))?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ParseOnlyError {
    #[error("Invalid APDU: {0}")]
    Apdu(#[from] ApduError),
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

/// Run the session described by `options` on `ctx`.
///
/// With `info` set only the readers and drivers are listed. Otherwise a reader
/// is selected and every APDU is parsed, sent and its answer printed; the
/// first failure stops the session.
pub async fn run<C, W>(ctx: &mut C, options: &Options, out: &mut W) -> SessionResult<C>
where
    C: CardContext,
    C::Card: Sync,
    W: Write,
{
    if options.info {
        write_avail(ctx, out)?;
        return Ok(());
    }

    let index = initialize(ctx, &options.reader)?;
    if options.wait_card {
        info!("Waiting for a card in {}", ctx.readers()[index].name);
        ctx.wait_for_card(index).map_err(SessionError::WaitCard)?;
    }
    if options.apdus.is_empty() {
        return Ok(());
    }

    info!("Connecting to {}", ctx.readers()[index].name);
    let card = ctx.connect(index).map_err(SessionError::Connect)?;

    for raw in &options.apdus {
        let apdu = build_apdu(&LogDiagnostics, raw)?;
        writeln!(out, "> {}", apdu)?;

        let response = card.transmit(&apdu).await?;
        writeln!(out, "< {}", response)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ccid_apdu::ApduField;
    use ccid_transport::mock::{MockContext, MockError, MockReader};

    use super::*;

    fn options(apdus: &[&[u8]]) -> Options {
        Options {
            apdus: apdus.iter().map(|a| a.to_vec()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn describes_cases() {
        let raw = [0x00, 0xA4, 0x04, 0x00, 0x02, 0x3F, 0x00, 0x00];
        let apdu = Apdu::parse(&raw).unwrap();
        assert_eq!(
            describe_apdu(&apdu),
            "case 4 short: cla=00 ins=A4 p1=04 p2=00 lc=2 le=256 data=3F00"
        );
    }

    #[test]
    fn parse_only_reports_first_bad_apdu() {
        let opts = options(&[&[0x00, 0xA4, 0x04, 0x00], &[0x00, 0xA4]]);
        let mut out = Vec::new();

        let err = parse_only(&opts, &mut out).unwrap_err();

        assert!(matches!(
            err,
            ParseOnlyError::Apdu(ApduError::DataTooShort {
                field: ApduField::Header,
                missing: 2
            })
        ));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "case 1: cla=00 ins=A4 p1=04 p2=00 lc=- le=- data=\n"
        );
    }

    #[tokio::test]
    async fn sends_to_first_reader_with_card() {
        let mut ctx = MockContext::new(vec![
            MockReader::new("Empty"),
            MockReader::new("Card").with_answers(vec![vec![0x6F, 0x10, 0x90, 0x00]]),
        ]);
        let opts = options(&[&[0x00, 0xA4, 0x04, 0x00, 0x00]]);
        let mut out = Vec::new();

        run(&mut ctx, &opts, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "> 00A4040000\n< 6F10 9000\n");
        assert_eq!(
            ctx.card(1).unwrap().sent(),
            vec![vec![0x00, 0xA4, 0x04, 0x00, 0x00]]
        );
    }

    #[tokio::test]
    async fn waits_for_card_before_connecting() {
        let mut ctx = MockContext::new(vec![
            MockReader::new("Empty"),
            MockReader::new("Card").with_answers(vec![vec![0x90, 0x00]]),
        ]);
        let opts = Options {
            wait_card: true,
            ..options(&[&[0x00, 0xA4, 0x00, 0x0C]])
        };
        let mut out = Vec::new();

        run(&mut ctx, &opts, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "> 00A4000C
< 9000
");
    }

    #[tokio::test]
    async fn wait_for_card_fails_on_empty_reader() {
        let mut ctx = MockContext::new(vec![MockReader::new("Empty")]);
        let mut opts = options(&[&[0x00, 0xA4, 0x00, 0x0C]]);
        opts.wait_card = true;
        let mut out = Vec::new();

        let err = run(&mut ctx, &opts, &mut out).await.unwrap_err();

        assert!(matches!(err, SessionError::WaitCard(MockError::NoCard)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn stops_on_malformed_apdu() {
        let mut ctx =
            MockContext::new(vec![MockReader::new("Card").with_answers(vec![vec![0x90, 0x00]])]);
        let opts = options(&[&[0x00, 0xD6, 0x00, 0x00, 0x04, 0x01]]);
        let mut out = Vec::new();

        let err = run(&mut ctx, &opts, &mut out).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Apdu(ApduError::DataTooShort {
                field: ApduField::Data,
                missing: 3
            })
        ));
        assert!(ctx.card(0).unwrap().sent().is_empty());
    }
}

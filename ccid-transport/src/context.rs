// SPDX-License-Identifier: Apache-2.0

//! Card context boundary and reader selection

use log::{debug, error, warn};

use crate::errors::ContextError;
use crate::Exchange;

/// Driver that talks to a reader (e.g. PC/SC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderDriver {
    pub short_name: String,
    pub name: String,
}

/// Reader as enumerated by a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderInfo {
    pub name: String,
    pub driver: ReaderDriver,
}

/// Card driver configured in a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDriver {
    pub short_name: String,
    pub name: String,
}

impl CardDriver {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            name: name.into(),
        }
    }
}

/// Reader selection, from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Reader index; `None` picks the first reader with a card
    pub reader: Option<usize>,
    /// Card driver to force, by short name
    pub card_driver: Option<String>,
}

/// Smart-card middleware context: readers, card drivers and connections
pub trait CardContext {
    /// Error defined by the middleware
    type Error: std::error::Error;

    /// Connected card, used to exchange APDUs
    type Card: Exchange;

    /// Readers known to the context, in index order
    fn readers(&self) -> &[ReaderInfo];

    /// Configured card drivers
    fn card_drivers(&self) -> &[CardDriver];

    /// Whether a card is present in reader `index`
    fn detect_card_presence(&self, index: usize) -> Result<bool, Self::Error>;

    /// Block until a card is present in reader `index`
    fn wait_for_card(&self, index: usize) -> Result<(), Self::Error>;

    /// Force the card driver with the given short name
    fn set_card_driver(&mut self, short_name: &str) -> Result<(), ContextError<Self::Error>>;

    /// Connect to the card in reader `index`
    fn connect(&self, index: usize) -> Result<Self::Card, Self::Error>;
}

/// Look up a card driver by short name
pub fn find_card_driver<'a>(drivers: &'a [CardDriver], short_name: &str) -> Option<&'a CardDriver> {
    drivers.iter().find(|d| d.short_name == short_name)
}

/// Apply `config` to `ctx` and pick a reader.
///
/// Without an explicit reader the first reader holding a card is used, falling
/// back to reader 0 when none has one. Returns the reader index.
pub fn initialize<C: CardContext>(
    ctx: &mut C,
    config: &ReaderConfig,
) -> Result<usize, ContextError<C::Error>> {
    if let Some(driver) = config.card_driver.as_deref() {
        if let Err(err) = ctx.set_card_driver(driver) {
            error!("Card driver '{}' not found!", driver);
            return Err(err);
        }
    }

    let count = ctx.readers().len();
    if count == 0 {
        error!("No readers found");
        return Err(ContextError::NoReadersFound);
    }

    let index = match config.reader {
        Some(index) if index >= count => {
            error!("Reader {} not found, {} readers available", index, count);
            return Err(ContextError::ReaderNotFound { index, count });
        }
        Some(index) => index,
        None => first_reader_with_card(ctx).unwrap_or(0),
    };

    debug!("Using reader {}: {}", index, ctx.readers()[index].name);
    Ok(index)
}

fn first_reader_with_card<C: CardContext>(ctx: &C) -> Option<usize> {
    for (index, reader) in ctx.readers().iter().enumerate() {
        match ctx.detect_card_presence(index) {
            Ok(true) => {
                debug!("Using reader with a card: {}", reader.name);
                return Some(index);
            }
            Ok(false) => {}
            Err(err) => warn!("Card detection failed on {}: {}", reader.name, err),
        }
    }
    None
}

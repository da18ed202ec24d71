mod errors;

use std::{ffi::CString, sync::Mutex, time::Duration};

use ccid_transport::{
    async_trait, find_card_driver, Apdu, CardContext, CardDriver, ContextError, Exchange,
    ReaderDriver, ReaderInfo, ResponseApdu,
};
pub use errors::PcscTransportError;
use log::{debug, info};
pub use pcsc;
use pcsc::{Card, Context, Protocols, ReaderState, Scope, ShareMode, State, MAX_BUFFER_SIZE};

pub const PCSC_DRIVER_SHORT_NAME: &str = "pcsc";
pub const PCSC_DRIVER_NAME: &str = "PC/SC reader";
pub const DEFAULT_CARD_DRIVER: &str = "default";

pub struct PcscContext {
    context: Context,
    names: Vec<CString>,
    readers: Vec<ReaderInfo>,
    card_drivers: Vec<CardDriver>,
    card_driver: Option<String>,
}

impl PcscContext {
    /// Establish a user-scope PC/SC context and enumerate its readers
    pub fn establish() -> Result<Self, PcscTransportError> {
        let context = Context::establish(Scope::User)?;

        let names = match context.list_readers_owned() {
            Ok(names) => names,
            Err(pcsc::Error::NoReadersAvailable) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let readers = names
            .iter()
            .map(|name| -> Result<ReaderInfo, PcscTransportError> {
                Ok(ReaderInfo {
                    name: name.to_str()?.to_string(),
                    driver: ReaderDriver {
                        short_name: PCSC_DRIVER_SHORT_NAME.to_string(),
                        name: PCSC_DRIVER_NAME.to_string(),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("PC/SC context with {} readers", readers.len());

        Ok(PcscContext {
            context,
            names,
            readers,
            card_drivers: vec![CardDriver::new(
                DEFAULT_CARD_DRIVER,
                "Default driver for unknown cards",
            )],
            card_driver: None,
        })
    }

    /// Forced card driver, if any
    pub fn card_driver(&self) -> Option<&str> {
        self.card_driver.as_deref()
    }

    fn reader_name(&self, index: usize) -> Result<&CString, PcscTransportError> {
        self.names
            .get(index)
            .ok_or(PcscTransportError::NoSuchReader(index))
    }
}

impl CardContext for PcscContext {
    type Error = PcscTransportError;
    type Card = PcscCard;

    fn readers(&self) -> &[ReaderInfo] {
        &self.readers
    }

    fn card_drivers(&self) -> &[CardDriver] {
        &self.card_drivers
    }

    fn detect_card_presence(&self, index: usize) -> Result<bool, Self::Error> {
        let name = self.reader_name(index)?.clone();
        let mut states = [ReaderState::new(name, State::UNAWARE)];
        self.context.get_status_change(Duration::ZERO, &mut states)?;

        Ok(states[0].event_state().contains(State::PRESENT))
    }

    fn wait_for_card(&self, index: usize) -> Result<(), Self::Error> {
        let name = self.reader_name(index)?.clone();
        let mut states = [ReaderState::new(name, State::UNAWARE)];

        loop {
            // no timeout: returns on the next reader event
            self.context.get_status_change(None::<Duration>, &mut states)?;
            if states[0].event_state().contains(State::PRESENT) {
                debug!("Card present in {}", self.readers[index].name);
                return Ok(());
            }
            states[0].sync_current_state();
        }
    }

    fn set_card_driver(&mut self, short_name: &str) -> Result<(), ContextError<Self::Error>> {
        let driver = find_card_driver(&self.card_drivers, short_name)
            .ok_or_else(|| ContextError::CardDriverNotFound(short_name.to_string()))?;
        self.card_driver = Some(driver.short_name.clone());
        Ok(())
    }

    fn connect(&self, index: usize) -> Result<Self::Card, Self::Error> {
        let name = self.reader_name(index)?;
        let card = self
            .context
            .connect(name, ShareMode::Shared, Protocols::ANY)?;

        Ok(PcscCard {
            card: Mutex::new(card),
        })
    }
}

pub struct PcscCard {
    card: Mutex<Card>,
}

impl PcscCard {
    pub fn exchange(&self, command: &Apdu<'_>) -> Result<ResponseApdu, PcscTransportError> {
        let card = self.card.lock().expect("PC/SC card poisoned");

        let apdu = command.serialize();
        info!("[{:3}] >> {:}", apdu.len(), hex::encode(&apdu));

        let mut rapdu_buf = [0; MAX_BUFFER_SIZE];
        let rapdu = card.transmit(&apdu, &mut rapdu_buf)?;

        info!("[{:3}] << {:}", rapdu.len(), hex::encode(rapdu));

        if rapdu.len() < 2 {
            return Err(PcscTransportError::Comm("response was too short"));
        }

        Ok(ResponseApdu::from_answer(rapdu.to_vec())?)
    }
}

#[async_trait]
impl Exchange for PcscCard {
    type Error = PcscTransportError;

    async fn exchange(&self, command: &Apdu<'_>) -> Result<ResponseApdu, Self::Error> {
        self.exchange(command)
    }
}

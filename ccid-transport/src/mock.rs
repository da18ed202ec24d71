// SPDX-License-Identifier: Apache-2.0

//! In-memory context and card with scripted answers

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ccid_apdu::{Apdu, ApduError, ResponseApdu};
use log::info;
use thiserror::Error;

use crate::context::{find_card_driver, CardContext, CardDriver, ReaderDriver, ReaderInfo};
use crate::errors::ContextError;
use crate::Exchange;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MockError {
    #[error("No card present")]
    NoCard,
    #[error("Card detection failed")]
    DetectionFailed,
    #[error("No scripted answer left")]
    NoAnswer,
    #[error("Reader {0} does not exist")]
    NoSuchReader(usize),
    #[error("Malformed scripted answer: {0}")]
    Apdu(#[from] ApduError),
}

#[derive(Debug, Default)]
struct CardState {
    answers: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

/// Card answering from a script; clones share the script and the sent log
#[derive(Debug, Clone, Default)]
pub struct MockCard {
    state: Arc<Mutex<CardState>>,
}

impl MockCard {
    /// Card replying with `answers` (payload + SW1 SW2) in order
    pub fn new(answers: Vec<Vec<u8>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CardState {
                answers: answers.into(),
                sent: Vec::new(),
            })),
        }
    }

    /// Commands received so far, as wire bytes
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().expect("mock card poisoned").sent.clone()
    }
}

#[async_trait]
impl Exchange for MockCard {
    type Error = MockError;

    async fn exchange(&self, command: &Apdu<'_>) -> Result<ResponseApdu, Self::Error> {
        let mut state = self.state.lock().expect("mock card poisoned");
        let bytes = command.serialize();
        info!("[{:3}] >> {}", bytes.len(), hex::encode(&bytes));
        state.sent.push(bytes);

        let answer = state.answers.pop_front().ok_or(MockError::NoAnswer)?;
        info!("[{:3}] << {}", answer.len(), hex::encode(&answer));
        Ok(ResponseApdu::from_answer(answer)?)
    }
}

/// Reader of a [`MockContext`]
#[derive(Debug, Clone)]
pub struct MockReader {
    info: ReaderInfo,
    card: Option<MockCard>,
    detection_fails: bool,
}

impl MockReader {
    /// Empty reader
    pub fn new(name: &str) -> Self {
        Self {
            info: ReaderInfo {
                name: name.to_string(),
                driver: ReaderDriver {
                    short_name: "mock".to_string(),
                    name: "Mock reader".to_string(),
                },
            },
            card: None,
            detection_fails: false,
        }
    }

    /// Insert a card without scripted answers
    pub fn with_card(self) -> Self {
        self.with_answers(Vec::new())
    }

    /// Insert a card replying with `answers`
    pub fn with_answers(mut self, answers: Vec<Vec<u8>>) -> Self {
        self.card = Some(MockCard::new(answers));
        self
    }

    /// Make card detection fail on this reader
    pub fn with_detection_error(mut self) -> Self {
        self.detection_fails = true;
        self
    }
}

/// Context over a fixed list of [`MockReader`]s
#[derive(Debug, Clone)]
pub struct MockContext {
    readers: Vec<MockReader>,
    infos: Vec<ReaderInfo>,
    card_drivers: Vec<CardDriver>,
    selected: Option<String>,
}

impl MockContext {
    pub fn new(readers: Vec<MockReader>) -> Self {
        let infos = readers.iter().map(|r| r.info.clone()).collect();
        Self {
            readers,
            infos,
            card_drivers: vec![CardDriver::new("default", "Default driver for unknown cards")],
            selected: None,
        }
    }

    /// Replace the configured card drivers
    pub fn with_card_drivers(mut self, drivers: Vec<CardDriver>) -> Self {
        self.card_drivers = drivers;
        self
    }

    /// Card inserted in reader `index`, sharing state with connections to it
    pub fn card(&self, index: usize) -> Option<&MockCard> {
        self.readers.get(index).and_then(|r| r.card.as_ref())
    }

    /// Short name of the forced card driver
    pub fn selected_card_driver(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

impl CardContext for MockContext {
    type Error = MockError;
    type Card = MockCard;

    fn readers(&self) -> &[ReaderInfo] {
        &self.infos
    }

    fn card_drivers(&self) -> &[CardDriver] {
        &self.card_drivers
    }

    fn detect_card_presence(&self, index: usize) -> Result<bool, Self::Error> {
        let reader = self.readers.get(index).ok_or(MockError::NoSuchReader(index))?;
        if reader.detection_fails {
            return Err(MockError::DetectionFailed);
        }
        Ok(reader.card.is_some())
    }

    /// Nothing is ever inserted later, so an empty reader fails at once
    fn wait_for_card(&self, index: usize) -> Result<(), Self::Error> {
        if self.detect_card_presence(index)? {
            Ok(())
        } else {
            Err(MockError::NoCard)
        }
    }

    fn set_card_driver(&mut self, short_name: &str) -> Result<(), ContextError<Self::Error>> {
        let driver = find_card_driver(&self.card_drivers, short_name)
            .ok_or_else(|| ContextError::CardDriverNotFound(short_name.to_string()))?;
        self.selected = Some(driver.short_name.clone());
        Ok(())
    }

    fn connect(&self, index: usize) -> Result<Self::Card, Self::Error> {
        let reader = self.readers.get(index).ok_or(MockError::NoSuchReader(index))?;
        reader.card.clone().ok_or(MockError::NoCard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_shares_card_state() {
        let ctx = MockContext::new(vec![MockReader::new("R").with_answers(vec![vec![0x90, 0x00]])]);
        let card = ctx.connect(0).unwrap();

        let command = Apdu::new(0x00, 0xA4, 0x00, 0x0C);
        let response = card.exchange(&command).await.unwrap();

        assert!(response.is_success());
        assert_eq!(ctx.card(0).unwrap().sent(), vec![vec![0x00, 0xA4, 0x00, 0x0C]]);
    }

    #[test]
    fn connect_without_card() {
        let ctx = MockContext::new(vec![MockReader::new("Empty")]);
        assert_eq!(ctx.connect(0).unwrap_err(), MockError::NoCard);
        assert_eq!(ctx.connect(4).unwrap_err(), MockError::NoSuchReader(4));
    }

    #[test]
    fn wait_for_card_in_reader() {
        let ctx = MockContext::new(vec![
            MockReader::new("Empty"),
            MockReader::new("Card").with_card(),
            MockReader::new("Broken").with_detection_error(),
        ]);

        assert_eq!(ctx.wait_for_card(1), Ok(()));
        assert_eq!(ctx.wait_for_card(0), Err(MockError::NoCard));
        assert_eq!(ctx.wait_for_card(2), Err(MockError::DetectionFailed));
        assert_eq!(ctx.wait_for_card(3), Err(MockError::NoSuchReader(3)));
    }
}

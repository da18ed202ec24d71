// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use ccid_apdu::{Apdu, ApduFlags, ResponseApdu};
use log::debug;

use crate::errors::TransmitError;
use crate::Exchange;

const CLA_GET_RESPONSE: u8 = 0x00;
const INS_GET_RESPONSE: u8 = 0xC0;
const SW1_BYTES_AVAILABLE: u8 = 0x61;
const SW1_WRONG_LENGTH: u8 = 0x6C;
/// GET RESPONSE rounds allowed for one command
pub const MAX_GET_RESPONSE_ROUNDS: usize = 64;

fn le_from_sw2(sw2: u8) -> u16 {
    if sw2 == 0 {
        256
    } else {
        sw2 as u16
    }
}

/// APDU transmission with the follow-ups permitted by [`ApduFlags`]
#[async_trait]
pub trait Transmit: Exchange + Sync {
    /// Send `command`; unless the flags forbid it, resend once on SW1 = 0x6C
    /// and collect chained data with GET RESPONSE on SW1 = 0x61.
    async fn transmit(
        &self,
        command: &Apdu<'_>,
    ) -> Result<ResponseApdu, TransmitError<Self::Error>> {
        let flags = command.flags();
        let mut response = self
            .exchange(command)
            .await
            .map_err(TransmitError::Exchange)?;

        if response.sw1 == SW1_WRONG_LENGTH && !flags.contains(ApduFlags::NO_RETRY_WRONG_LENGTH) {
            let le = le_from_sw2(response.sw2);
            debug!("Wrong length, resending with Le={}", le);

            let retry = command.clone().with_le(le)?;
            response = self
                .exchange(&retry)
                .await
                .map_err(TransmitError::Exchange)?;
        }

        if !flags.contains(ApduFlags::NO_GET_RESPONSE) {
            let mut data = std::mem::take(&mut response.data);
            let mut rounds = 0;

            while response.sw1 == SW1_BYTES_AVAILABLE {
                if rounds == MAX_GET_RESPONSE_ROUNDS {
                    return Err(TransmitError::ResponseChainTooLong(rounds));
                }
                rounds += 1;

                let le = le_from_sw2(response.sw2);
                debug!("{} bytes available, sending GET RESPONSE", le);

                let get_response =
                    Apdu::new(CLA_GET_RESPONSE, INS_GET_RESPONSE, 0x00, 0x00).with_le(le)?;
                response = self
                    .exchange(&get_response)
                    .await
                    .map_err(TransmitError::Exchange)?;
                data.append(&mut response.data);
            }

            response.data = data;
        }

        Ok(response)
    }
}

impl<T: Exchange + Sync> Transmit for T {}

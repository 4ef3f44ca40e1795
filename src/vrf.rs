// Randomness request protocol between the raffle and its VRF coordinator
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, pubkey::Pubkey};

use crate::{error::RaffleError, events::RaffleEvent};

/// Blocks the oracle waits before answering a request
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Random words asked for per round
pub const NUM_WORDS: u32 = 1;

/// A 256-bit random value, big-endian.
pub type RandomWord = [u8; 32];

/// Parameters of a single randomness request.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequest {
    /// Raffle account that will receive the callback
    pub consumer: Pubkey,
    /// Gas lane / price key
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

/// Capability to ask an external oracle for randomness.
///
/// Returns the id that the later `FulfillRandomWords` delivery must carry.
/// The call never waits for the random value itself.
pub trait RandomnessCoordinator {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<u64, RaffleError>;
}

/// On-chain coordinator: queues requests in the transaction log.
///
/// Ids are sequential per raffle starting at 1. Queued requests are only
/// published by [`RequestQueue::flush`], after the instruction has
/// committed to the state transition.
pub struct RequestQueue {
    last_request_id: u64,
    outbox: Vec<RaffleEvent>,
}

impl RequestQueue {
    pub fn new(last_request_id: u64) -> Self {
        Self {
            last_request_id,
            outbox: Vec::new(),
        }
    }

    #[cfg(test)]
    fn pending(&self) -> &[RaffleEvent] {
        &self.outbox
    }

    pub fn flush(self) -> ProgramResult {
        for event in &self.outbox {
            event.emit()?;
        }
        Ok(())
    }
}

impl RandomnessCoordinator for RequestQueue {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<u64, RaffleError> {
        let request_id = self
            .last_request_id
            .checked_add(1)
            .ok_or(RaffleError::ArithmeticOverflow)?;
        self.last_request_id = request_id;
        self.outbox.push(RaffleEvent::RandomWordsRequested {
            request_id,
            consumer: request.consumer,
            key_hash: request.key_hash,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
        });
        Ok(request_id)
    }
}

/// `word mod count` over the full 256-bit word.
///
/// Returns `None` when there is nobody to pick.
pub fn winner_index(word: &RandomWord, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }
    let count = count as u128;
    let remainder = word
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % count);
    Some(remainder as u64)
}

/// Widens a `u64` into a random word.
pub fn word_from_u64(value: u64) -> RandomWord {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

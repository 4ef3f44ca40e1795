// Raffle notifications published to the transaction log
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult, log::sol_log_data, msg, program_error::ProgramError, pubkey::Pubkey,
};

/// Observable side effects of raffle instructions.
///
/// Each event is borsh encoded and written with `sol_log_data`, so indexers
/// and the oracle can decode it from the `Program data:` log lines.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleEvent {
    /// A player entered the current round
    RaffleEnter { player: Pubkey },
    /// Entry closed and a winner is being calculated
    RequestedRaffleWinner { request_id: u64 },
    /// Outbound request consumed by the oracle
    RandomWordsRequested {
        request_id: u64,
        consumer: Pubkey,
        key_hash: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
    /// Round settled and the pool paid out
    WinnerPicked { winner: Pubkey },
}

impl RaffleEvent {
    pub fn emit(&self) -> ProgramResult {
        match self {
            RaffleEvent::RaffleEnter { player } => msg!("RaffleEnter: {}", player),
            RaffleEvent::RequestedRaffleWinner { request_id } => {
                msg!("RequestedRaffleWinner: request {}", request_id)
            }
            RaffleEvent::RandomWordsRequested { request_id, consumer, .. } => {
                msg!("RandomWordsRequested: request {} for {}", request_id, consumer)
            }
            RaffleEvent::WinnerPicked { winner } => msg!("WinnerPicked: {}", winner),
        }

        let data = self
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        sol_log_data(&[&data]);
        Ok(())
    }
}

use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstruction,

    /// Lamports sent with an entry are below the entrance fee
    #[error("Not enough lamports sent to cover the entrance fee")]
    NotEnoughEntranceFee,

    /// Entry attempted while a winner is being calculated
    #[error("Raffle is not open")]
    NotOpen,

    /// Upkeep was triggered while the eligibility gate is closed
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Randomness delivered for a request this raffle is not waiting on
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// The prize could not be moved to the winner
    #[error("Payout to winner failed")]
    PayoutFailed,

    #[error("Only the configured coordinator can fulfill randomness")]
    OnlyCoordinatorCanFulfill,

    /// Entrant list is at capacity
    #[error("Raffle is full")]
    RaffleFull,

    #[error("Raffle already initialized")]
    AlreadyInitialized,

    /// Construction parameters out of range
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    #[error("No random words delivered")]
    InvalidRandomWords,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Settlement reached with an empty entrant list
    #[error("Raffle has no players")]
    NoPlayers,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}

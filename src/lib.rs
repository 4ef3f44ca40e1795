// VRF Raffle
// A self-running raffle on Solana: entry, keeper-triggered draws and
// oracle-delivered randomness

pub mod entrypoint;
pub mod error;
pub mod events;
pub mod instruction;
pub mod payout;
pub mod processor;
pub mod state;
pub mod vrf;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data).map_err(|error| {
        msg!("Raffle instruction failed: {}", error);
        error
    })
}

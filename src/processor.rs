use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    error::RaffleError,
    events::RaffleEvent,
    instruction::RaffleInstruction,
    payout::LamportPayout,
    state::{Raffle, RaffleConfig},
    vrf::{RandomWord, RequestQueue},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle { config } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, config, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        config: RaffleConfig,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer || !raffle_info.is_signer {
            msg!("Payer and raffle account must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner == program_id {
            msg!("Raffle account {} is already initialized", raffle_info.key);
            return Err(RaffleError::AlreadyInitialized.into());
        }
        if raffle_info.owner != &system_program::id() {
            msg!("Raffle account must be a fresh system account");
            return Err(ProgramError::IncorrectProgramId);
        }

        let clock = Clock::get()?;
        let max_players = config.max_players;
        let raffle = Raffle::new(config, clock.unix_timestamp)?;

        let space = Raffle::space(max_players);
        let rent_lamports = Rent::get()?.minimum_balance(space);
        invoke(
            &system_instruction::create_account(
                payer_info.key,
                raffle_info.key,
                rent_lamports,
                space as u64,
                program_id,
            ),
            &[
                payer_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: EntranceFee={}, Interval={}s, MaxPlayers={}, Coordinator={}",
            raffle.entrance_fee(),
            raffle.interval(),
            max_players,
            raffle.config.coordinator
        );
        Ok(())
    }

    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let event = raffle.enter(*player_info.key, amount)?;

        msg!("Transferring {} lamports to raffle pool {}", amount, raffle_info.key);
        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        event.emit()?;

        msg!(
            "Players: {}, pool: {} lamports",
            raffle.number_of_players(),
            raffle.pool()
        );
        Ok(())
    }

    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(raffle_info, program_id)?;
        let check = raffle.check_upkeep(Clock::get()?.unix_timestamp);

        msg!(
            "Upkeep needed: {} (blocked by {:?})",
            check.upkeep_needed(),
            check.blocker()
        );
        let data = check
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        set_return_data(&data);
        Ok(())
    }

    /// Anyone may close a round; the eligibility gate is the only guard
    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let now = Clock::get()?.unix_timestamp;

        let mut queue = RequestQueue::new(raffle.last_request_id);
        let request_id = raffle.perform_upkeep(now, raffle_info.key, &mut queue)?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        queue.flush()?;
        RaffleEvent::RequestedRaffleWinner { request_id }.emit()?;
        Ok(())
    }

    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[RandomWord],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;

        if !coordinator_info.is_signer || *coordinator_info.key != raffle.config.coordinator {
            msg!(
                "{} is not the coordinator of raffle {}",
                coordinator_info.key,
                raffle_info.key
            );
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        let now = Clock::get()?.unix_timestamp;
        let rent_reserve = Rent::get()?.minimum_balance(raffle_info.data_len());
        let mut payout = LamportPayout::new(raffle_info, winner_info, rent_reserve);
        let event = raffle.fulfill_random_words(request_id, random_words, now, &mut payout)?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        event.emit()?;
        Ok(())
    }

    fn load_raffle(raffle_info: &AccountInfo, program_id: &Pubkey) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        Raffle::load(&raffle_info.data.borrow())
    }
}

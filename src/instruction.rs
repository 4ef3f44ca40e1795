use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{error::RaffleError, state::RaffleConfig, vrf::RandomWord};

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Create and initialize a raffle account
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Payer funding the raffle account
    /// 1. `[signer, writable]` The new raffle account
    /// 2. `[]` The system program
    InitializeRaffle { config: RaffleConfig },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player, pays `amount` lamports
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports paid, at least the entrance fee
        amount: u64,
    },

    /// Evaluate the eligibility gate; result is set as return data
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Close entry and request randomness (anyone can call this)
    ///
    /// Accounts expected:
    /// 0. `[writable]` The raffle account
    PerformUpkeep,

    /// Deliver randomness for a pending request and settle the round
    ///
    /// Accounts expected:
    /// 0. `[signer]` The raffle's coordinator
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The winner, `players[words[0] % players.len()]`
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<RandomWord>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(RaffleError::InvalidInstruction)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_u64(rest)?;
                let (key_hash, rest) = Self::unpack_bytes32(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (max_players, rest) = Self::unpack_u32(rest)?;
                let (coordinator, _) = Self::unpack_bytes32(rest)?;
                Self::InitializeRaffle {
                    config: RaffleConfig {
                        entrance_fee,
                        interval: interval as i64,
                        coordinator: Pubkey::new_from_array(coordinator),
                        key_hash,
                        subscription_id,
                        callback_gas_limit,
                        max_players,
                    },
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            2 => Self::CheckUpkeep,
            3 => Self::PerformUpkeep,
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = rest
                    .split_first()
                    .ok_or(RaffleError::InvalidInstruction)?;
                let mut random_words = Vec::with_capacity(*count as usize);
                for _ in 0..*count {
                    let (word, next) = Self::unpack_bytes32(rest)?;
                    random_words.push(word);
                    rest = next;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstruction.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeRaffle { config } => {
                buf.push(0);
                buf.extend_from_slice(&config.entrance_fee.to_le_bytes());
                buf.extend_from_slice(&config.interval.to_le_bytes());
                buf.extend_from_slice(&config.key_hash);
                buf.extend_from_slice(&config.subscription_id.to_le_bytes());
                buf.extend_from_slice(&config.callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&config.max_players.to_le_bytes());
                buf.extend_from_slice(config.coordinator.as_ref());
            }
            Self::EnterRaffle { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(2),
            Self::PerformUpkeep => buf.push(3),
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                let count =
                    u8::try_from(random_words.len()).map_err(|_| RaffleError::InvalidRandomWords)?;
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.push(count);
                for word in random_words {
                    buf.extend_from_slice(word);
                }
            }
        }
        Ok(buf)
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (value, rest) = input.split_at(8);
        Ok((u64::from_le_bytes(*array_ref![value, 0, 8]), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        if input.len() < 4 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (value, rest) = input.split_at(4);
        Ok((u32::from_le_bytes(*array_ref![value, 0, 4]), rest))
    }

    fn unpack_bytes32(input: &[u8]) -> Result<([u8; 32], &[u8]), ProgramError> {
        if input.len() < 32 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (value, rest) = input.split_at(32);
        Ok((*array_ref![value, 0, 32], rest))
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    payer: &Pubkey,
    raffle_account: &Pubkey,
    config: RaffleConfig,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::InitializeRaffle { config }.pack()?;

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(*raffle_account, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    player: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::EnterRaffle { amount }.pack()?;

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create check_upkeep instruction
pub fn check_upkeep(
    program_id: &Pubkey,
    raffle_account: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::CheckUpkeep.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle_account, false)],
        data,
    })
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    raffle_account: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::PerformUpkeep.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new(*raffle_account, false)],
        data,
    })
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    coordinator: &Pubkey,
    raffle_account: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<RandomWord>,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::FulfillRandomWords {
        request_id,
        random_words,
    }
    .pack()?;

    let accounts = vec![
        AccountMeta::new_readonly(*coordinator, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrf::word_from_u64;

    #[test]
    fn initialize_raffle_layout() {
        let coordinator = Pubkey::new_unique();
        let config = RaffleConfig {
            entrance_fee: 100,
            interval: 30,
            coordinator,
            key_hash: [3u8; 32],
            subscription_id: 11,
            callback_gas_limit: 500_000,
            max_players: 16,
        };

        let data = RaffleInstruction::InitializeRaffle {
            config: config.clone(),
        }
        .pack()
        .unwrap();

        assert_eq!(data.len(), 1 + 8 + 8 + 32 + 8 + 4 + 4 + 32);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..9], &100u64.to_le_bytes());
        assert_eq!(&data[data.len() - 32..], coordinator.as_ref());
        assert_eq!(
            RaffleInstruction::unpack(&data).unwrap(),
            RaffleInstruction::InitializeRaffle { config }
        );
    }

    #[test]
    fn fulfill_carries_every_word() {
        let ix = RaffleInstruction::FulfillRandomWords {
            request_id: 7,
            random_words: vec![word_from_u64(5), [0xff; 32]],
        };
        let data = ix.pack().unwrap();

        assert_eq!(data.len(), 1 + 8 + 1 + 64);
        assert_eq!(RaffleInstruction::unpack(&data).unwrap(), ix);
    }

    #[test]
    fn truncated_data_is_rejected() {
        let expected = Err(ProgramError::from(RaffleError::InvalidInstruction));

        assert_eq!(RaffleInstruction::unpack(&[]), expected);
        assert_eq!(RaffleInstruction::unpack(&[1, 0, 0]), expected);
        // claims two words, carries one
        let mut data = vec![4];
        data.extend_from_slice(&7u64.to_le_bytes());
        data.push(2);
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(RaffleInstruction::unpack(&data), expected);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            RaffleInstruction::unpack(&[9]),
            Err(ProgramError::from(RaffleError::InvalidInstruction))
        );
    }

    #[test]
    fn too_many_words_do_not_pack() {
        let ix = RaffleInstruction::FulfillRandomWords {
            request_id: 1,
            random_words: vec![[0u8; 32]; 256],
        };
        assert_eq!(
            ix.pack(),
            Err(ProgramError::from(RaffleError::InvalidRandomWords))
        );
    }
}

// Prize transfer for settled rounds
use solana_program::{account_info::AccountInfo, msg, pubkey::Pubkey};

use crate::error::RaffleError;

/// Moves a settled pool to the winner.
///
/// A failed payout must leave both balances as they were.
pub trait PrizePayout {
    fn pay(&mut self, winner: &Pubkey, amount: u64) -> Result<(), RaffleError>;
}

/// Pays out of the program-owned raffle account by editing lamports directly.
pub struct LamportPayout<'a, 'b> {
    vault: &'b AccountInfo<'a>,
    winner: &'b AccountInfo<'a>,
    /// Lamports the raffle account keeps to stay rent exempt
    rent_reserve: u64,
}

impl<'a, 'b> LamportPayout<'a, 'b> {
    pub fn new(vault: &'b AccountInfo<'a>, winner: &'b AccountInfo<'a>, rent_reserve: u64) -> Self {
        Self {
            vault,
            winner,
            rent_reserve,
        }
    }
}

impl<'a, 'b> PrizePayout for LamportPayout<'a, 'b> {
    fn pay(&mut self, winner: &Pubkey, amount: u64) -> Result<(), RaffleError> {
        if self.winner.key != winner {
            msg!("Winner account {} does not match picked winner {}", self.winner.key, winner);
            return Err(RaffleError::PayoutFailed);
        }
        if !self.winner.is_writable {
            msg!("Winner account is not writable");
            return Err(RaffleError::PayoutFailed);
        }

        let vault_after = self
            .vault
            .lamports()
            .checked_sub(amount)
            .filter(|left| *left >= self.rent_reserve)
            .ok_or_else(|| {
                msg!(
                    "Raffle account holds {} lamports, cannot pay {} and keep {} for rent",
                    self.vault.lamports(),
                    amount,
                    self.rent_reserve
                );
                RaffleError::PayoutFailed
            })?;
        let winner_after = self
            .winner
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::PayoutFailed)?;

        let mut vault_lamports = self
            .vault
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)?;
        let mut winner_lamports = self
            .winner
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)?;
        **vault_lamports = vault_after;
        **winner_lamports = winner_after;

        msg!("Paid {} lamports to {}", amount, winner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        vault_key: Pubkey,
        winner_key: Pubkey,
        owner: Pubkey,
        vault_lamports: u64,
        winner_lamports: u64,
        vault_data: Vec<u8>,
        winner_data: Vec<u8>,
    }

    impl Fixture {
        fn new(vault_lamports: u64, winner_lamports: u64) -> Self {
            Self {
                vault_key: Pubkey::new_unique(),
                winner_key: Pubkey::new_unique(),
                owner: Pubkey::new_unique(),
                vault_lamports,
                winner_lamports,
                vault_data: vec![],
                winner_data: vec![],
            }
        }
    }

    #[test]
    fn pays_pool_and_keeps_rent() {
        let mut f = Fixture::new(1_300, 50);
        let winner_key = f.winner_key;
        let vault = AccountInfo::new(
            &f.vault_key,
            false,
            true,
            &mut f.vault_lamports,
            &mut f.vault_data,
            &f.owner,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &f.winner_key,
            false,
            true,
            &mut f.winner_lamports,
            &mut f.winner_data,
            &f.owner,
            false,
            0,
        );

        LamportPayout::new(&vault, &winner, 1_000)
            .pay(&winner_key, 300)
            .unwrap();

        assert_eq!(vault.lamports(), 1_000);
        assert_eq!(winner.lamports(), 350);
    }

    #[test]
    fn refuses_to_dip_into_rent_reserve() {
        let mut f = Fixture::new(1_200, 50);
        let winner_key = f.winner_key;
        let vault = AccountInfo::new(
            &f.vault_key,
            false,
            true,
            &mut f.vault_lamports,
            &mut f.vault_data,
            &f.owner,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &f.winner_key,
            false,
            true,
            &mut f.winner_lamports,
            &mut f.winner_data,
            &f.owner,
            false,
            0,
        );

        let result = LamportPayout::new(&vault, &winner, 1_000).pay(&winner_key, 300);

        assert_eq!(result, Err(RaffleError::PayoutFailed));
        assert_eq!(vault.lamports(), 1_200);
        assert_eq!(winner.lamports(), 50);
    }

    #[test]
    fn refuses_wrong_winner_account() {
        let mut f = Fixture::new(1_300, 50);
        let vault = AccountInfo::new(
            &f.vault_key,
            false,
            true,
            &mut f.vault_lamports,
            &mut f.vault_data,
            &f.owner,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &f.winner_key,
            false,
            true,
            &mut f.winner_lamports,
            &mut f.winner_data,
            &f.owner,
            false,
            0,
        );

        let result = LamportPayout::new(&vault, &winner, 1_000).pay(&Pubkey::new_unique(), 300);

        assert_eq!(result, Err(RaffleError::PayoutFailed));
        assert_eq!(vault.lamports(), 1_300);
    }

    #[test]
    fn refuses_read_only_winner() {
        let mut f = Fixture::new(1_300, 50);
        let winner_key = f.winner_key;
        let vault = AccountInfo::new(
            &f.vault_key,
            false,
            true,
            &mut f.vault_lamports,
            &mut f.vault_data,
            &f.owner,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &f.winner_key,
            false,
            false,
            &mut f.winner_lamports,
            &mut f.winner_data,
            &f.owner,
            false,
            0,
        );

        let result = LamportPayout::new(&vault, &winner, 1_000).pay(&winner_key, 300);

        assert_eq!(result, Err(RaffleError::PayoutFailed));
        assert_eq!(winner.lamports(), 50);
    }
}

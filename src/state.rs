// VRF Raffle Program - State
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    error::RaffleError,
    events::RaffleEvent,
    payout::PrizePayout,
    vrf::{self, RandomWord, RandomWordsRequest, RandomnessCoordinator},
};

/// Lifecycle of a raffle round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Entry closed, waiting for the oracle to deliver randomness
    Calculating,
}

/// Construction parameters, fixed for the lifetime of the raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Minimum lamports per entry
    pub entrance_fee: u64,
    /// Seconds a round stays open before upkeep is allowed
    pub interval: i64,
    /// The only key allowed to deliver random words
    pub coordinator: Pubkey,
    /// Gas lane / price key forwarded with every request
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    /// Capacity of the entrant list, sizes the account
    pub max_players: u32,
}

impl RaffleConfig {
    pub const LEN: usize = 8 + 8 + 32 + 32 + 8 + 4 + 4;

    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee == 0 || self.interval < 0 || self.max_players == 0 {
            return Err(RaffleError::InvalidConfig);
        }
        Ok(())
    }

    pub fn random_words_request(&self, consumer: &Pubkey) -> RandomWordsRequest {
        RandomWordsRequest {
            consumer: *consumer,
            key_hash: self.key_hash,
            subscription_id: self.subscription_id,
            request_confirmations: vrf::REQUEST_CONFIRMATIONS,
            callback_gas_limit: self.callback_gas_limit,
            num_words: vrf::NUM_WORDS,
        }
    }
}

/// Condition that keeps the raffle from advancing
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpkeepBlocker {
    NotOpen,
    IntervalNotElapsed,
    NoPlayers,
    NoBalance,
}

/// Snapshot of the eligibility gate.
///
/// Published as return data by `CheckUpkeep` and logged when
/// `PerformUpkeep` is rejected.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
    pub balance: u64,
    pub num_players: u64,
    pub state: RaffleState,
}

impl UpkeepCheck {
    pub fn upkeep_needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_players && self.has_balance
    }

    /// First failing condition, in gate order
    pub fn blocker(&self) -> Option<UpkeepBlocker> {
        if !self.is_open {
            Some(UpkeepBlocker::NotOpen)
        } else if !self.time_passed {
            Some(UpkeepBlocker::IntervalNotElapsed)
        } else if !self.has_players {
            Some(UpkeepBlocker::NoPlayers)
        } else if !self.has_balance {
            Some(UpkeepBlocker::NoBalance)
        } else {
            None
        }
    }
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    pub config: RaffleConfig,
    pub state: RaffleState,
    /// Entrants of the current round, in entry order
    pub players: Vec<Pubkey>,
    /// Lamports collected this round
    pub pool: u64,
    /// Start of the current round
    pub last_timestamp: UnixTimestamp,
    /// Request the raffle is waiting on, only set while calculating
    pub pending_request: Option<u64>,
    /// Id of the last request issued, 0 before the first round closes
    pub last_request_id: u64,
    pub recent_winner: Option<Pubkey>,
}

impl Raffle {
    /// Account size for a raffle holding up to `max_players` entrants
    pub fn space(max_players: u32) -> usize {
        1 + RaffleConfig::LEN + 1 + 4 + 32 * max_players as usize + 8 + 8 + (1 + 8) + 8 + (1 + 32)
    }

    pub fn new(config: RaffleConfig, now: UnixTimestamp) -> Result<Self, RaffleError> {
        config.validate()?;
        Ok(Self {
            is_initialized: true,
            config,
            state: RaffleState::Open,
            players: Vec::new(),
            pool: 0,
            last_timestamp: now,
            pending_request: None,
            last_request_id: 0,
            recent_winner: None,
        })
    }

    /// Decodes account data, allowing trailing unused capacity
    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        let raffle = Self::deserialize(&mut &data[..])
            .map_err(|_| ProgramError::InvalidAccountData)?;
        if !raffle.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    /// Adds `player` to the current round
    pub fn enter(&mut self, player: Pubkey, fee_paid: u64) -> Result<RaffleEvent, RaffleError> {
        if fee_paid < self.config.entrance_fee {
            return Err(RaffleError::NotEnoughEntranceFee);
        }
        if self.state != RaffleState::Open {
            return Err(RaffleError::NotOpen);
        }
        if self.players.len() >= self.config.max_players as usize {
            return Err(RaffleError::RaffleFull);
        }
        let pool = self
            .pool
            .checked_add(fee_paid)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.players.push(player);
        self.pool = pool;
        Ok(RaffleEvent::RaffleEnter { player })
    }

    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepCheck {
        let elapsed = now.saturating_sub(self.last_timestamp);
        UpkeepCheck {
            is_open: self.state == RaffleState::Open,
            time_passed: elapsed >= self.config.interval,
            has_players: !self.players.is_empty(),
            has_balance: self.pool > 0,
            balance: self.pool,
            num_players: self.players.len() as u64,
            state: self.state,
        }
    }

    /// Closes entry and asks `coordinator` for randomness.
    ///
    /// The gate is evaluated again here because anyone may have entered or
    /// settled between a keeper's `check_upkeep` and this call.
    pub fn perform_upkeep<C: RandomnessCoordinator>(
        &mut self,
        now: UnixTimestamp,
        consumer: &Pubkey,
        coordinator: &mut C,
    ) -> Result<u64, RaffleError> {
        let check = self.check_upkeep(now);
        if !check.upkeep_needed() {
            msg!(
                "Upkeep not needed: balance={}, players={}, state={:?}, blocked by {:?}",
                check.balance,
                check.num_players,
                check.state,
                check.blocker()
            );
            return Err(RaffleError::UpkeepNotNeeded);
        }

        let request = self.config.random_words_request(consumer);
        let request_id = coordinator.request_random_words(&request)?;

        self.state = RaffleState::Calculating;
        self.pending_request = Some(request_id);
        self.last_request_id = request_id;
        Ok(request_id)
    }

    /// Settles the round the oracle answered for.
    ///
    /// Nothing is written unless the payout succeeds.
    pub fn fulfill_random_words<P: PrizePayout>(
        &mut self,
        request_id: u64,
        random_words: &[RandomWord],
        now: UnixTimestamp,
        payout: &mut P,
    ) -> Result<RaffleEvent, RaffleError> {
        if self.state != RaffleState::Calculating || self.pending_request != Some(request_id) {
            msg!(
                "Request {} does not match pending request {:?}",
                request_id,
                self.pending_request
            );
            return Err(RaffleError::UnknownRequest);
        }
        let word = random_words.first().ok_or(RaffleError::InvalidRandomWords)?;

        // entry is closed while calculating, so this is the count upkeep saw
        let index = vrf::winner_index(word, self.players.len() as u64)
            .ok_or(RaffleError::NoPlayers)?;
        let winner = self.players[index as usize];
        msg!("Winner index {} of {}", index, self.players.len());

        payout.pay(&winner, self.pool)?;

        self.recent_winner = Some(winner);
        self.reset_round(now);
        Ok(RaffleEvent::WinnerPicked { winner })
    }

    fn reset_round(&mut self, now: UnixTimestamp) {
        self.players.clear();
        self.pool = 0;
        self.last_timestamp = now;
        self.pending_request = None;
        self.state = RaffleState::Open;
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> i64 {
        self.config.interval
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.state
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        self.recent_winner
    }

    pub fn player(&self, index: usize) -> Option<Pubkey> {
        self.players.get(index).copied()
    }

    pub fn number_of_players(&self) -> u64 {
        self.players.len() as u64
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn pool(&self) -> u64 {
        self.pool
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }

    pub fn num_words(&self) -> u32 {
        vrf::NUM_WORDS
    }

    pub fn request_confirmations(&self) -> u16 {
        vrf::REQUEST_CONFIRMATIONS
    }
}

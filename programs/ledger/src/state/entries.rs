use anchor_lang::prelude::*;

use crate::error::LedgerError;
use crate::utils::scan::Releasable;
use crate::utils::vesting::vested_amount;

/// Fixed-date lock class chosen by the migrator per credit.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockClass {
    Standard = 0,
    Extended = 1,
}

/// Vesting pool; each has its own cliff and duration.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VestingPool {
    Migration = 0,
    Contributor = 1,
}

/// Cooldown queue keyed by where the principal came from.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownSource {
    Stake = 0,
    FixedLock = 1,
    Vesting = 2,
    ContributorVesting = 3,
}

impl VestingPool {
    /// Queue that unlocked principal from this pool cools down in.
    pub fn cooldown_source(self) -> CooldownSource {
        match self {
            VestingPool::Migration => CooldownSource::Vesting,
            VestingPool::Contributor => CooldownSource::ContributorVesting,
        }
    }
}

/// Identity of an entry inside its position's append-only array.
pub trait QueueEntry {
    fn position(&self) -> Pubkey;
    fn kind(&self) -> u8;
    fn index(&self) -> u32;
}

/// Lump-sum lock created by a migration credit.
/// Seeds: [b"fixed_lock", position, class, index]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct FixedLock {
    pub position: Pubkey,
    pub class: u8,
    pub index: u32,
    pub amount: u64,
    pub unlock_time: i64,
    pub bump: u8,
}

/// Linear vesting schedule with cliff.
/// Seeds: [b"vesting", position, pool, index]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct VestingSchedule {
    pub position: Pubkey,
    pub pool: u8,
    pub index: u32,
    pub total_amount: u64,
    pub claimed: u64,
    /// Cliff end; nothing releases before this.
    pub start_time: i64,
    pub duration: i64,
    pub bump: u8,
}

/// Principal waiting out the cooldown delay.
/// Seeds: [b"cooldown", position, source, index]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct CooldownRequest {
    pub position: Pubkey,
    pub source: u8,
    pub index: u32,
    pub amount: u64,
    pub maturity_time: i64,
    pub bump: u8,
}

impl VestingSchedule {
    pub fn vested(&self, now: i64) -> Result<u64> {
        Ok(vested_amount(self.total_amount, self.start_time, self.duration, now)?)
    }

    pub fn is_exhausted(&self) -> bool {
        self.claimed >= self.total_amount
    }

    /// Nothing of the schedule remains unvested at `now`.
    pub fn is_fully_vested(&self, now: i64) -> Result<bool> {
        Ok(self.vested(now)? >= self.total_amount)
    }
}

impl Releasable for FixedLock {
    fn releasable(&self, now: i64) -> Result<Option<u64>> {
        Ok((self.unlock_time <= now).then_some(self.amount))
    }
}

impl Releasable for CooldownRequest {
    fn releasable(&self, now: i64) -> Result<Option<u64>> {
        Ok((self.maturity_time <= now).then_some(self.amount))
    }
}

impl Releasable for VestingSchedule {
    fn releasable(&self, now: i64) -> Result<Option<u64>> {
        if self.is_exhausted() {
            return Ok(Some(0));
        }
        let vested = self.vested(now)?;
        let releasable = vested
            .checked_sub(self.claimed)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(Some(releasable))
    }

    fn mark_released(&mut self, amount: u64) -> Result<()> {
        let claimed = self
            .claimed
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        require!(claimed <= self.total_amount, LedgerError::MathOverflow);
        self.claimed = claimed;
        Ok(())
    }
}

impl QueueEntry for FixedLock {
    fn position(&self) -> Pubkey {
        self.position
    }
    fn kind(&self) -> u8 {
        self.class
    }
    fn index(&self) -> u32 {
        self.index
    }
}

impl QueueEntry for VestingSchedule {
    fn position(&self) -> Pubkey {
        self.position
    }
    fn kind(&self) -> u8 {
        self.pool
    }
    fn index(&self) -> u32 {
        self.index
    }
}

impl QueueEntry for CooldownRequest {
    fn position(&self) -> Pubkey {
        self.position
    }
    fn kind(&self) -> u8 {
        self.source
    }
    fn index(&self) -> u32 {
        self.index
    }
}

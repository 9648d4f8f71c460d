use anchor_lang::prelude::*;

use crate::error::LedgerError;
use crate::state::entries::{CooldownSource, LockClass, VestingPool};

/// Length and consumption cursor of one append-only entry array.
///
/// FIFO tracks keep `cursor <= len`. Round-robin (vesting) tracks also keep
/// `head`: every schedule below it is fully released, and `cursor` is an
/// ever-increasing rotation count over the live range `[head, len)`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct Track {
    pub len: u32,
    pub cursor: u64,
    pub head: u32,
}

/// Schedules one round-robin call visits: `size` entries of the live range,
/// `start` entries past `head`, wrapping within `[head, len)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RotationWindow {
    pub head: u32,
    pub live: u64,
    pub start: u64,
    pub size: u64,
    /// Walks fully vested schedules from `head` instead of rotating.
    pub draining: bool,
}

impl RotationWindow {
    /// Entry index at `offset` into the window.
    pub fn index(&self, offset: u64) -> u32 {
        if self.live == 0 {
            return self.head;
        }
        (self.head as u64 + (self.start + offset) % self.live) as u32
    }
}

impl Track {
    /// Record a new entry at `index`; entries are appended strictly in order.
    pub fn push(&mut self, index: u32) -> Result<()> {
        require!(index == self.len, LedgerError::EntryOutOfOrder);
        self.len = self.len.checked_add(1).ok_or(LedgerError::ValueOutOfRange)?;
        Ok(())
    }

    /// Entries not yet passed by a FIFO cursor.
    pub fn outstanding(&self) -> u64 {
        (self.len as u64).saturating_sub(self.cursor)
    }

    /// Window size of a FIFO scan bounded by `max` (0 = unbounded).
    pub fn fifo_window(&self, max: u32) -> u64 {
        let outstanding = self.outstanding();
        if max == 0 {
            outstanding
        } else {
            outstanding.min(max as u64)
        }
    }

    /// Schedules of a round-robin track not yet fully released.
    pub fn live(&self) -> u64 {
        (self.len as u64).saturating_sub(self.head as u64)
    }

    /// Round-robin window bounded by `max` (0 = `default_window`).
    ///
    /// Schedules of one pool share a cliff and a duration, so they finish in
    /// index order and fully vested ones always form a prefix of the live
    /// range. While the head schedule is fully vested the window drains that
    /// prefix from `head`; otherwise it rotates from `cursor`.
    pub fn rotation_window(&self, max: u32, default_window: u16, head_vested: bool) -> RotationWindow {
        let live = self.live();
        let bound = if max == 0 { default_window as u64 } else { max as u64 };
        let start = if head_vested || live == 0 { 0 } else { self.cursor % live };
        RotationWindow {
            head: self.head,
            live,
            start,
            size: bound.min(live),
            draining: head_vested && live > 0,
        }
    }

    /// Move the cursor forward to `cursor`; it never moves back.
    pub fn advance_to(&mut self, cursor: u64) -> Result<()> {
        require!(cursor >= self.cursor, LedgerError::EntryOutOfOrder);
        self.cursor = cursor;
        Ok(())
    }

    /// Retire `count` fully released schedules at the head.
    pub fn advance_head(&mut self, count: u64) -> Result<()> {
        require!(count <= self.live(), LedgerError::EntryOutOfOrder);
        self.head = self
            .head
            .checked_add(count as u32)
            .ok_or(LedgerError::ValueOutOfRange)?;
        Ok(())
    }
}

/// Per-owner share balances, reward checkpoint and entry tracks.
/// Seeds: [b"position", ledger, owner]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Position {
    pub ledger: Pubkey,
    pub owner: Pubkey,
    /// Transferable shares.
    pub free_shares: u64,
    /// Shares still under a lock or vesting schedule.
    pub locked_shares: u64,
    /// Signed accumulator checkpoint; see `LedgerState::pending_of`.
    pub reward_debt: i128,
    /// Opted in to operator-driven batch compounding.
    pub autocompound: bool,
    pub fixed_locks: [Track; 2],
    pub vesting: [Track; 2],
    pub cooldowns: [Track; 4],
    pub bump: u8,
}

impl Position {
    /// Populate a freshly created (all-zero) position; no-op on an existing one.
    pub fn ensure_initialized(&mut self, ledger: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.ledger = ledger;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn total_shares(&self) -> Result<u64> {
        Ok(self
            .free_shares
            .checked_add(self.locked_shares)
            .ok_or(LedgerError::MathOverflow)?)
    }

    pub fn fixed_track(&self, class: LockClass) -> &Track {
        &self.fixed_locks[class as usize]
    }

    pub fn fixed_track_mut(&mut self, class: LockClass) -> &mut Track {
        &mut self.fixed_locks[class as usize]
    }

    pub fn vesting_track(&self, pool: VestingPool) -> &Track {
        &self.vesting[pool as usize]
    }

    pub fn vesting_track_mut(&mut self, pool: VestingPool) -> &mut Track {
        &mut self.vesting[pool as usize]
    }

    pub fn cooldown_track(&self, source: CooldownSource) -> &Track {
        &self.cooldowns[source as usize]
    }

    pub fn cooldown_track_mut(&mut self, source: CooldownSource) -> &mut Track {
        &mut self.cooldowns[source as usize]
    }
}

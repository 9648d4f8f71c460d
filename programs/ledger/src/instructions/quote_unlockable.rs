use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{FixedLock, LedgerState, LockClass, Position, VestingPool, VestingSchedule};
use crate::utils::scan::preview_scan;
use crate::utils::window::{fifo_window, vesting_window};

/// Read-only sum of what `unlock_*`/`restake_*` would release right now.
///
/// `remaining_accounts` holds four consecutive groups sized by `counts`:
/// standard locks and extended locks (from each cursor), then migration and
/// contributor schedules laid out as `unlock_vesting` expects them for the
/// per-pool `max_schedules`. Each group is previewed over the entries supplied
/// for it.
pub fn quote_unlockable<'info>(
    ctx: Context<'_, '_, 'info, 'info, QuoteUnlockable<'info>>,
    counts: [u8; 4],
    max_schedules: [u32; 2],
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let position = &ctx.accounts.position;
    let position_key = position.key();
    let default_window = ctx.accounts.ledger.params.default_vesting_window;

    let infos: &'info [AccountInfo<'info>] = ctx.remaining_accounts;
    let mut bounds = [0usize; 5];
    for (i, count) in counts.iter().enumerate() {
        bounds[i + 1] = bounds[i] + *count as usize;
    }
    require!(infos.len() >= bounds[4], LedgerError::EntryWindowShort);

    let mut fixed = [0u64; 2];
    for (slot, class) in [LockClass::Standard, LockClass::Extended].into_iter().enumerate() {
        let window: Vec<Account<'info, FixedLock>> = fifo_window(
            &infos[bounds[slot]..bounds[slot + 1]],
            position.fixed_track(class),
            0,
            &position_key,
            class as u8,
        )?;
        fixed[slot] = preview_scan(window.iter().map(|e| &**e), now)?;
    }

    let mut vesting = [0u64; 2];
    for (slot, pool) in [VestingPool::Migration, VestingPool::Contributor].into_iter().enumerate() {
        let track = position.vesting_track(pool);
        let window: Vec<Account<'info, VestingSchedule>> = vesting_window(
            &infos[bounds[2 + slot]..bounds[3 + slot]],
            track,
            max_schedules[slot],
            default_window,
            &position_key,
            pool as u8,
            now,
            false,
        )?;
        vesting[slot] = registry::preview_vesting(track, window.iter().map(|s| &**s), now)?;
    }

    let total = fixed
        .iter()
        .chain(vesting.iter())
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .ok_or(LedgerError::MathOverflow)?;

    emit!(UnlockableQuote {
        owner: position.owner,
        fixed,
        vesting,
        total,
        now,
    });
    Ok(total)
}

#[derive(Accounts)]
pub struct QuoteUnlockable<'info> {
    #[account(seeds = [LEDGER_SEED], bump = ledger.bump)]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        seeds = [POSITION_SEED, ledger.key().as_ref(), position.owner.as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,
}

#[event]
pub struct UnlockableQuote {
    pub owner: Pubkey,
    /// Per `LockClass`.
    pub fixed: [u64; 2],
    /// Per `VestingPool`.
    pub vesting: [u64; 2],
    pub total: u64,
    pub now: i64,
}

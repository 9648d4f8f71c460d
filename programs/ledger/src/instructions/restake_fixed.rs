use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{FixedLock, LedgerState, LockClass, Position};
use crate::utils::window::fifo_window;

/// Consume matured `class` locks and turn their locked shares into free
/// shares in place. No cooldown, no token movement.
pub fn restake_fixed<'info>(
    ctx: Context<'_, '_, 'info, 'info, RestakeFixed<'info>>,
    class: LockClass,
    max_entries: u32,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let position_key = ctx.accounts.position.key();
    let track = *ctx.accounts.position.fixed_track(class);
    let mut window: Vec<Account<'info, FixedLock>> = fifo_window(
        ctx.remaining_accounts,
        &track,
        max_entries,
        &position_key,
        class as u8,
    )?;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let outcome = registry::consume_fixed_locks(
        position,
        class,
        window.iter_mut().map(|e| &mut **e),
        now,
    )?;
    l.convert_locked_to_free(position, outcome.released)?;

    emit!(LocksRestaked {
        owner: position.owner,
        class,
        amount: outcome.released,
        cursor: outcome.cursor,
        free_shares: position.free_shares,
        locked_shares: position.locked_shares,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct RestakeFixed<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        mut,
        seeds = [POSITION_SEED, ledger.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
        has_one = owner @ LedgerError::UnauthorizedOwner,
    )]
    pub position: Box<Account<'info, Position>>,

    pub owner: Signer<'info>,
}

#[event]
pub struct LocksRestaked {
    pub owner: Pubkey,
    pub class: LockClass,
    pub amount: u64,
    pub cursor: u64,
    pub free_shares: u64,
    pub locked_shares: u64,
}

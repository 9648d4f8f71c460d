use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{LedgerState, Position, VestingPool, VestingSchedule};
use crate::utils::window::vesting_window;

/// Release vested principal from a vesting window (laid out as for
/// `unlock_vesting`) and keep it staked as free shares.
pub fn restake_vesting<'info>(
    ctx: Context<'_, '_, 'info, 'info, RestakeVesting<'info>>,
    pool: VestingPool,
    max_schedules: u32,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let position_key = ctx.accounts.position.key();
    let track = *ctx.accounts.position.vesting_track(pool);
    let mut window: Vec<Account<'info, VestingSchedule>> = vesting_window(
        ctx.remaining_accounts,
        &track,
        max_schedules,
        ctx.accounts.ledger.params.default_vesting_window,
        &position_key,
        pool as u8,
        now,
        true,
    )?;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let outcome = registry::consume_vesting(
        position,
        pool,
        window.iter_mut().map(|s| &mut **s),
        now,
    )?;
    for schedule in &window {
        schedule.exit(&crate::ID)?;
    }
    l.convert_locked_to_free(position, outcome.released)?;

    emit!(VestingRestaked {
        owner: position.owner,
        pool,
        amount: outcome.released,
        cursor: outcome.cursor,
        head: position.vesting_track(pool).head,
        free_shares: position.free_shares,
        locked_shares: position.locked_shares,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct RestakeVesting<'info> {
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
pub struct VestingRestaked {
    pub owner: Pubkey,
    pub pool: VestingPool,
    pub amount: u64,
    pub cursor: u64,
    pub head: u32,
    pub free_shares: u64,
    pub locked_shares: u64,
}

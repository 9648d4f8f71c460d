use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;

use crate::constants::{COOLDOWN_SEED, LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::instructions::request_withdrawal::WithdrawalRequested;
use crate::registry;
use crate::state::{CooldownRequest, LedgerState, Position, VestingPool, VestingSchedule};
use crate::utils::window::vesting_window;

/// Release vested principal from a window of `pool` schedules and move it into
/// that pool's cooldown queue.
///
/// `remaining_accounts`: the pool's `VestingSchedule` entries (writable). While
/// the head schedule is fully vested they run from the head in index order;
/// otherwise from the rotation position, wrapping within the unfinished ones.
pub fn unlock_vesting<'info>(
    ctx: Context<'_, '_, 'info, 'info, UnlockVesting<'info>>,
    pool: VestingPool,
    max_schedules: u32,
    cooldown_index: u32,
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

    let source = pool.cooldown_source();
    let request = &mut ctx.accounts.cooldown;
    request.bump = ctx.bumps.cooldown;
    registry::enqueue_cooldown(
        l,
        position,
        request,
        position_key,
        source,
        cooldown_index,
        outcome.released,
        now,
    )?;

    emit!(VestingUnlocked {
        owner: position.owner,
        pool,
        released: outcome.released,
        visited: outcome.advanced,
        cursor: outcome.cursor,
        head: position.vesting_track(pool).head,
    });
    emit!(WithdrawalRequested {
        owner: position.owner,
        source,
        index: cooldown_index,
        amount: outcome.released,
        maturity_time: request.maturity_time,
        total_queued: l.total_queued,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(pool: VestingPool, max_schedules: u32, cooldown_index: u32)]
pub struct UnlockVesting<'info> {
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

    #[account(
        init,
        payer = owner,
        space = 8 + CooldownRequest::INIT_SPACE,
        seeds = [
            COOLDOWN_SEED,
            position.key().as_ref(),
            &[pool.cooldown_source() as u8],
            &cooldown_index.to_le_bytes(),
        ],
        bump
    )]
    pub cooldown: Box<Account<'info, CooldownRequest>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct VestingUnlocked {
    pub owner: Pubkey,
    pub pool: VestingPool,
    pub released: u64,
    pub visited: u64,
    pub cursor: u64,
    pub head: u32,
}

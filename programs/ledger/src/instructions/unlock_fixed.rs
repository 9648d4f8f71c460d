use anchor_lang::prelude::*;

use crate::constants::{COOLDOWN_SEED, LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::instructions::request_withdrawal::WithdrawalRequested;
use crate::registry;
use crate::state::{CooldownRequest, CooldownSource, FixedLock, LedgerState, LockClass, Position};
use crate::utils::window::fifo_window;

/// Consume matured `class` locks and move their principal into the
/// fixed-lock cooldown queue.
///
/// `remaining_accounts`: the class's `FixedLock` entries in index order from
/// the track cursor.
pub fn unlock_fixed<'info>(
    ctx: Context<'_, '_, 'info, 'info, UnlockFixed<'info>>,
    class: LockClass,
    max_entries: u32,
    cooldown_index: u32,
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

    let request = &mut ctx.accounts.cooldown;
    request.bump = ctx.bumps.cooldown;
    registry::enqueue_cooldown(
        l,
        position,
        request,
        position_key,
        CooldownSource::FixedLock,
        cooldown_index,
        outcome.released,
        now,
    )?;

    emit!(LocksUnlocked {
        owner: position.owner,
        class,
        released: outcome.released,
        consumed: outcome.advanced,
        cursor: outcome.cursor,
    });
    emit!(WithdrawalRequested {
        owner: position.owner,
        source: CooldownSource::FixedLock,
        index: cooldown_index,
        amount: outcome.released,
        maturity_time: request.maturity_time,
        total_queued: l.total_queued,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(class: LockClass, max_entries: u32, cooldown_index: u32)]
pub struct UnlockFixed<'info> {
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
            &[CooldownSource::FixedLock as u8],
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
pub struct LocksUnlocked {
    pub owner: Pubkey,
    pub class: LockClass,
    pub released: u64,
    pub consumed: u64,
    pub cursor: u64,
}

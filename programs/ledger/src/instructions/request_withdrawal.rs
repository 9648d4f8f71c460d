use anchor_lang::prelude::*;

use crate::constants::{COOLDOWN_SEED, LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{CooldownRequest, CooldownSource, LedgerState, Position};

/// Burn free shares and queue their principal behind the cooldown delay.
pub fn request_withdrawal(ctx: Context<RequestWithdrawal>, amount: u64, index: u32) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let position_key = ctx.accounts.position.key();

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let request = &mut ctx.accounts.cooldown;
    request.bump = ctx.bumps.cooldown;
    registry::enqueue_cooldown(
        l,
        position,
        request,
        position_key,
        CooldownSource::Stake,
        index,
        amount,
        now,
    )?;

    emit!(WithdrawalRequested {
        owner: position.owner,
        source: CooldownSource::Stake,
        index,
        amount,
        maturity_time: request.maturity_time,
        total_queued: l.total_queued,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(amount: u64, index: u32)]
pub struct RequestWithdrawal<'info> {
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
            &[CooldownSource::Stake as u8],
            &index.to_le_bytes(),
        ],
        bump
    )]
    pub cooldown: Box<Account<'info, CooldownRequest>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct WithdrawalRequested {
    pub owner: Pubkey,
    pub source: CooldownSource,
    pub index: u32,
    pub amount: u64,
    pub maturity_time: i64,
    pub total_queued: u64,
}

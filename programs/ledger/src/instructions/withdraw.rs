use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{CooldownRequest, CooldownSource, LedgerState, Position};
use crate::utils::window::fifo_window;

/// Pay out matured cooldown requests of `source`.
///
/// `remaining_accounts`: the queue's `CooldownRequest` entries in index order
/// from the track cursor.
pub fn withdraw<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    source: CooldownSource,
    max_requests: u32,
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    // Avoid borrow checker conflicts: capture AccountInfos/keys before taking mutable borrows.
    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_bump = ctx.accounts.ledger.bump;
    let position_key = ctx.accounts.position.key();
    let track = *ctx.accounts.position.cooldown_track(source);
    let mut window: Vec<Account<'info, CooldownRequest>> = fifo_window(
        ctx.remaining_accounts,
        &track,
        max_requests,
        &position_key,
        source as u8,
    )?;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let outcome = registry::withdraw_matured(
        l,
        position,
        source,
        window.iter_mut().map(|r| &mut **r),
        now,
    )?;

    let signer_seeds: &[&[&[u8]]] = &[&[LEDGER_SEED, &[ledger_bump]]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.principal_vault.to_account_info(),
                to: ctx.accounts.owner_token_account.to_account_info(),
                authority: ledger_ai,
            },
            signer_seeds,
        ),
        outcome.released,
    )?;

    emit!(Withdrawn {
        owner: ctx.accounts.owner.key(),
        source,
        amount: outcome.released,
        requests: outcome.advanced,
        cursor: outcome.cursor,
        total_queued: ctx.accounts.ledger.total_queued,
    });
    Ok(outcome.released)
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
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
        mut,
        address = ledger.principal_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = owner_token_account.mint == ledger.principal_mint @ LedgerError::InvalidTokenMint,
        constraint = owner_token_account.owner == owner.key() @ LedgerError::InvalidTokenAccount,
    )]
    pub owner_token_account: Box<Account<'info, TokenAccount>>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct Withdrawn {
    pub owner: Pubkey,
    pub source: CooldownSource,
    pub amount: u64,
    pub requests: u64,
    pub cursor: u64,
    pub total_queued: u64,
}

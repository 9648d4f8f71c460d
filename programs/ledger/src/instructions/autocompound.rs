use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::compound;
use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};
use crate::swap::{route_digest, CpiSwapVenue};

/// Swap the caller's pending reward into principal and mint what arrived as
/// free shares.
///
/// `remaining_accounts`: extra accounts forwarded to the swap program.
pub fn autocompound<'info>(
    ctx: Context<'_, '_, 'info, 'info, Autocompound<'info>>,
    min_amount_out: u64,
    routing_data: Vec<u8>,
) -> Result<()> {
    // Avoid borrow checker conflicts: capture AccountInfos before taking mutable borrows.
    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_bump = ctx.accounts.ledger.bump;
    let reward_vault_ai = ctx.accounts.reward_vault.to_account_info();
    let swap_program_ai = ctx.accounts.swap_program.to_account_info();
    let swap_authority_ai = ctx.accounts.swap_authority.to_account_info();
    let token_program_ai = ctx.accounts.token_program.to_account_info();

    let mut venue = CpiSwapVenue {
        ledger: ledger_ai,
        ledger_bump,
        reward_vault: reward_vault_ai,
        principal_vault: &mut *ctx.accounts.principal_vault,
        swap_program: swap_program_ai,
        swap_authority: swap_authority_ai,
        token_program: token_program_ai,
        route_accounts: ctx.remaining_accounts,
    };
    let outcome = compound::autocompound(
        &mut ctx.accounts.ledger,
        &mut ctx.accounts.position,
        &mut venue,
        min_amount_out,
        &routing_data,
    )?;

    emit!(Autocompounded {
        owner: ctx.accounts.owner.key(),
        pending: outcome.pending,
        received: outcome.receipt.received,
        reported: outcome.receipt.reported,
        free_shares: ctx.accounts.position.free_shares,
        route_digest: route_digest(&routing_data),
    });
    Ok(())
}

#[derive(Accounts)]
pub struct Autocompound<'info> {
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
        address = ledger.reward_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        address = ledger.principal_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: Matched against the configured swap program; invoked via CPI.
    #[account(
        executable,
        address = ledger.swap_program @ LedgerError::InvalidSwapVenue,
    )]
    pub swap_program: UncheckedAccount<'info>,

    /// CHECK: Matched against the configured swap authority; only approved as a delegate.
    #[account(address = ledger.swap_authority @ LedgerError::InvalidSwapVenue)]
    pub swap_authority: UncheckedAccount<'info>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct Autocompounded {
    pub owner: Pubkey,
    pub pending: u64,
    pub received: u64,
    pub reported: u64,
    pub free_shares: u64,
    pub route_digest: [u8; 32],
}

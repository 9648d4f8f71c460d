use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

/// Deposit principal and receive the same number of free shares.
pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require!(amount > 0, LedgerError::ZeroAmount);

    let ledger_key = ctx.accounts.ledger.key();
    let owner = ctx.accounts.owner.key();

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner_token_account.to_account_info(),
                to: ctx.accounts.principal_vault.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        amount,
    )?;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    position.ensure_initialized(ledger_key, owner, ctx.bumps.position);
    l.mint_free(position, amount)?;

    emit!(Staked {
        owner,
        amount,
        free_shares: position.free_shares,
        total_free_shares: l.total_free_shares,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, ledger.key().as_ref(), owner.key().as_ref()],
        bump
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

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct Staked {
    pub owner: Pubkey,
    pub amount: u64,
    pub free_shares: u64,
    pub total_free_shares: u64,
}

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::LedgerState;

pub fn deposit_rewards(ctx: Context<DepositRewards>, amount: u64) -> Result<()> {
    let l = &mut ctx.accounts.ledger;
    let increment = l.deposit_rewards(amount)?;
    let total_shares = l.total_shares()?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder_token_account.to_account_info(),
                to: ctx.accounts.reward_vault.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.reward_vault.reload()?;

    emit!(RewardsDeposited {
        funder: ctx.accounts.funder.key(),
        amount,
        increment,
        acc_reward_per_share: ctx.accounts.ledger.acc_reward_per_share,
        total_shares,
        vault_balance: ctx.accounts.reward_vault.amount,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct DepositRewards<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        has_one = funder @ LedgerError::UnauthorizedFunder,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        mut,
        address = ledger.reward_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = funder_token_account.mint == ledger.reward_mint @ LedgerError::InvalidTokenMint,
        constraint = funder_token_account.owner == funder.key() @ LedgerError::InvalidTokenAccount,
    )]
    pub funder_token_account: Box<Account<'info, TokenAccount>>,

    pub funder: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct RewardsDeposited {
    pub funder: Pubkey,
    pub amount: u64,
    pub increment: u128,
    pub acc_reward_per_share: u128,
    pub total_shares: u64,
    pub vault_balance: u64,
}

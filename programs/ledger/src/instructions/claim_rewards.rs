use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

/// Settle the position and pay out its pending reward. Zero pending is a
/// successful no-op.
pub fn claim_rewards(ctx: Context<ClaimRewards>) -> Result<u64> {
    // Avoid borrow checker conflicts: capture AccountInfos before taking mutable borrows.
    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_bump = ctx.accounts.ledger.bump;

    let pending = ctx.accounts.ledger.settle(&mut ctx.accounts.position)?;
    if pending > 0 {
        let signer_seeds: &[&[&[u8]]] = &[&[LEDGER_SEED, &[ledger_bump]]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.reward_vault.to_account_info(),
                    to: ctx.accounts.owner_reward_account.to_account_info(),
                    authority: ledger_ai,
                },
                signer_seeds,
            ),
            pending,
        )?;
    }

    emit!(RewardsClaimed {
        owner: ctx.accounts.owner.key(),
        amount: pending,
        reward_debt: ctx.accounts.position.reward_debt,
    });
    Ok(pending)
}

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    #[account(
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
        constraint = owner_reward_account.mint == ledger.reward_mint @ LedgerError::InvalidTokenMint,
    )]
    pub owner_reward_account: Box<Account<'info, TokenAccount>>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct RewardsClaimed {
    pub owner: Pubkey,
    pub amount: u64,
    pub reward_debt: i128,
}

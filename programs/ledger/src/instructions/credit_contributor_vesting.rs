use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{LEDGER_SEED, POSITION_SEED, ROLE_SEED, VESTING_SEED};
use crate::error::LedgerError;
use crate::instructions::credit_vesting::VestingCredited;
use crate::registry;
use crate::state::{LedgerState, Position, Role, RoleGrant, VestingPool, VestingSchedule};
use crate::utils::vesting::vesting_end;

/// Allow-listed contributors vest their own principal for `beneficiary` in
/// the contributor pool.
pub fn credit_contributor_vesting(
    ctx: Context<CreditContributorVesting>,
    beneficiary: Pubkey,
    amount: u64,
    index: u32,
) -> Result<()> {
    require!(beneficiary != Pubkey::default(), LedgerError::InvalidPubkey);
    require!(amount > 0, LedgerError::ZeroAmount);

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.contributor_token_account.to_account_info(),
                to: ctx.accounts.principal_vault.to_account_info(),
                authority: ctx.accounts.contributor.to_account_info(),
            },
        ),
        amount,
    )?;

    let ledger_key = ctx.accounts.ledger.key();
    let position_key = ctx.accounts.position.key();
    let now = Clock::get()?.unix_timestamp;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    position.ensure_initialized(ledger_key, beneficiary, ctx.bumps.position);

    let schedule = &mut ctx.accounts.schedule;
    schedule.bump = ctx.bumps.schedule;
    registry::credit_vesting(
        l,
        position,
        schedule,
        position_key,
        VestingPool::Contributor,
        index,
        amount,
        now,
    )?;

    emit!(VestingCredited {
        funder: ctx.accounts.contributor.key(),
        beneficiary,
        pool: VestingPool::Contributor,
        index,
        amount,
        start_time: ctx.accounts.schedule.start_time,
        duration: ctx.accounts.schedule.duration,
        end_time: vesting_end(ctx.accounts.schedule.start_time, ctx.accounts.schedule.duration)?,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey, amount: u64, index: u32)]
pub struct CreditContributorVesting<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        seeds = [
            ROLE_SEED,
            ledger.key().as_ref(),
            &[Role::Contributor as u8],
            contributor.key().as_ref(),
        ],
        bump = contributor_role.bump,
    )]
    pub contributor_role: Box<Account<'info, RoleGrant>>,

    #[account(
        init_if_needed,
        payer = contributor,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, ledger.key().as_ref(), beneficiary.as_ref()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        init,
        payer = contributor,
        space = 8 + VestingSchedule::INIT_SPACE,
        seeds = [
            VESTING_SEED,
            position.key().as_ref(),
            &[VestingPool::Contributor as u8],
            &index.to_le_bytes(),
        ],
        bump
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    #[account(
        mut,
        address = ledger.principal_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = contributor_token_account.mint == ledger.principal_mint @ LedgerError::InvalidTokenMint,
        constraint = contributor_token_account.owner == contributor.key() @ LedgerError::InvalidTokenAccount,
    )]
    pub contributor_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub contributor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

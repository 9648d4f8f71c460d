use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::constants::{LEDGER_SEED, POSITION_SEED, VESTING_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{LedgerState, Position, VestingPool, VestingSchedule};
use crate::utils::vesting::vesting_end;

/// Mint migrated principal into the vault and vest it for `beneficiary` in
/// the migration pool.
pub fn credit_vesting(ctx: Context<CreditVesting>, beneficiary: Pubkey, amount: u64, index: u32) -> Result<()> {
    require!(beneficiary != Pubkey::default(), LedgerError::InvalidPubkey);

    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_key = ctx.accounts.ledger.key();
    let ledger_bump = ctx.accounts.ledger.bump;
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
        VestingPool::Migration,
        index,
        amount,
        now,
    )?;

    let signer_seeds: &[&[&[u8]]] = &[&[LEDGER_SEED, &[ledger_bump]]];
    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.principal_mint.to_account_info(),
                to: ctx.accounts.principal_vault.to_account_info(),
                authority: ledger_ai,
            },
            signer_seeds,
        ),
        amount,
    )?;

    emit!(VestingCredited {
        funder: ctx.accounts.migrator.key(),
        beneficiary,
        pool: VestingPool::Migration,
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
pub struct CreditVesting<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        has_one = migrator @ LedgerError::UnauthorizedMigrator,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        init_if_needed,
        payer = migrator,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, ledger.key().as_ref(), beneficiary.as_ref()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        init,
        payer = migrator,
        space = 8 + VestingSchedule::INIT_SPACE,
        seeds = [
            VESTING_SEED,
            position.key().as_ref(),
            &[VestingPool::Migration as u8],
            &index.to_le_bytes(),
        ],
        bump
    )]
    pub schedule: Box<Account<'info, VestingSchedule>>,

    #[account(
        mut,
        address = ledger.principal_mint @ LedgerError::InvalidTokenMint,
    )]
    pub principal_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        address = ledger.principal_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub migrator: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct VestingCredited {
    /// Migrator or contributor that supplied the principal.
    pub funder: Pubkey,
    pub beneficiary: Pubkey,
    pub pool: VestingPool,
    pub index: u32,
    pub amount: u64,
    pub start_time: i64,
    pub duration: i64,
    pub end_time: i64,
}

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::constants::{FIXED_LOCK_SEED, LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::registry;
use crate::state::{FixedLock, LedgerState, LockClass, Position};

/// Mint migrated principal into the vault and lock it for `beneficiary`
/// under `class`.
pub fn credit_fixed_lock(
    ctx: Context<CreditFixedLock>,
    beneficiary: Pubkey,
    amount: u64,
    class: LockClass,
    index: u32,
) -> Result<()> {
    require!(beneficiary != Pubkey::default(), LedgerError::InvalidPubkey);

    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_key = ctx.accounts.ledger.key();
    let ledger_bump = ctx.accounts.ledger.bump;
    let position_key = ctx.accounts.position.key();
    let now = Clock::get()?.unix_timestamp;

    let l = &mut ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    position.ensure_initialized(ledger_key, beneficiary, ctx.bumps.position);

    let lock = &mut ctx.accounts.fixed_lock;
    lock.bump = ctx.bumps.fixed_lock;
    registry::credit_fixed_lock(l, position, lock, position_key, class, index, amount, now)?;

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

    emit!(FixedLockCredited {
        beneficiary,
        class,
        index,
        amount,
        unlock_time: ctx.accounts.fixed_lock.unlock_time,
        locked_shares: ctx.accounts.position.locked_shares,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey, amount: u64, class: LockClass, index: u32)]
pub struct CreditFixedLock<'info> {
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
        space = 8 + FixedLock::INIT_SPACE,
        seeds = [
            FIXED_LOCK_SEED,
            position.key().as_ref(),
            &[class as u8],
            &index.to_le_bytes(),
        ],
        bump
    )]
    pub fixed_lock: Box<Account<'info, FixedLock>>,

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
pub struct FixedLockCredited {
    pub beneficiary: Pubkey,
    pub class: LockClass,
    pub index: u32,
    pub amount: u64,
    pub unlock_time: i64,
    pub locked_shares: u64,
}

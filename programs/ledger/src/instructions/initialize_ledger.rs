use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{LEDGER_SEED, PRINCIPAL_VAULT_SEED, REWARD_VAULT_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerParams, LedgerState};

pub fn initialize_ledger(
    ctx: Context<InitializeLedger>,
    params: LedgerParams,
    migrator: Pubkey,
    funder: Pubkey,
    swap_program: Pubkey,
    swap_authority: Pubkey,
) -> Result<()> {
    params.validate()?;
    for key in [migrator, funder, swap_program, swap_authority] {
        require!(key != Pubkey::default(), LedgerError::InvalidPubkey);
    }
    require!(swap_program != crate::ID, LedgerError::InvalidSwapVenue);

    let ledger_key = ctx.accounts.ledger.key();
    require!(migrator != ledger_key, LedgerError::InvalidConfig);
    require!(funder != ledger_key, LedgerError::InvalidConfig);

    let principal_mint = &ctx.accounts.principal_mint;
    let reward_mint = &ctx.accounts.reward_mint;
    require_keys_neq!(
        principal_mint.key(),
        reward_mint.key(),
        LedgerError::InvalidTokenMint
    );
    // Migration credits mint principal, so the ledger must own the mint.
    require!(
        principal_mint.mint_authority == COption::Some(ledger_key),
        LedgerError::InvalidTokenMint
    );

    let l = &mut ctx.accounts.ledger;
    l.admin = ctx.accounts.admin.key();
    l.principal_mint = principal_mint.key();
    l.reward_mint = reward_mint.key();
    l.principal_vault = ctx.accounts.principal_vault.key();
    l.reward_vault = ctx.accounts.reward_vault.key();
    l.migrator = migrator;
    l.funder = funder;
    l.swap_program = swap_program;
    l.swap_authority = swap_authority;
    l.params = params;
    l.acc_reward_per_share = 0;
    l.total_free_shares = 0;
    l.total_locked_shares = 0;
    l.total_queued = 0;
    l.total_rewards_deposited = 0;
    l.busy = false;
    l.bump = ctx.bumps.ledger;
    l.principal_vault_bump = ctx.bumps.principal_vault;
    l.reward_vault_bump = ctx.bumps.reward_vault;

    emit!(LedgerInitialized {
        admin: l.admin,
        principal_mint: l.principal_mint,
        reward_mint: l.reward_mint,
        migrator,
        funder,
        swap_program,
        params,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeLedger<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + LedgerState::INIT_SPACE,
        seeds = [LEDGER_SEED],
        bump
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        init,
        payer = admin,
        token::mint = principal_mint,
        token::authority = ledger,
        seeds = [PRINCIPAL_VAULT_SEED, ledger.key().as_ref()],
        bump
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        token::mint = reward_mint,
        token::authority = ledger,
        seeds = [REWARD_VAULT_SEED, ledger.key().as_ref()],
        bump
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    pub principal_mint: Box<Account<'info, Mint>>,

    pub reward_mint: Box<Account<'info, Mint>>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct LedgerInitialized {
    pub admin: Pubkey,
    pub principal_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub migrator: Pubkey,
    pub funder: Pubkey,
    pub swap_program: Pubkey,
    pub params: LedgerParams,
}

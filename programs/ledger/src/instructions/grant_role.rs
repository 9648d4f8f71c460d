use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, ROLE_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Role, RoleGrant};

pub fn grant_role(ctx: Context<GrantRole>, role: Role, holder: Pubkey) -> Result<()> {
    require!(holder != Pubkey::default(), LedgerError::InvalidPubkey);

    let grant = &mut ctx.accounts.role_grant;
    grant.ledger = ctx.accounts.ledger.key();
    grant.holder = holder;
    grant.role = role as u8;
    grant.bump = ctx.bumps.role_grant;

    emit!(RoleGranted {
        admin: ctx.accounts.admin.key(),
        role,
        holder,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(role: Role, holder: Pubkey)]
pub struct GrantRole<'info> {
    #[account(
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        has_one = admin @ LedgerError::UnauthorizedAdmin,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        init,
        payer = admin,
        space = 8 + RoleGrant::INIT_SPACE,
        seeds = [ROLE_SEED, ledger.key().as_ref(), &[role as u8], holder.as_ref()],
        bump
    )]
    pub role_grant: Account<'info, RoleGrant>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct RoleGranted {
    pub admin: Pubkey,
    pub role: Role,
    pub holder: Pubkey,
}

use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, ROLE_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Role, RoleGrant};

pub fn revoke_role(ctx: Context<RevokeRole>, role: Role, holder: Pubkey) -> Result<()> {
    emit!(RoleRevoked {
        admin: ctx.accounts.admin.key(),
        role,
        holder,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(role: Role, holder: Pubkey)]
pub struct RevokeRole<'info> {
    #[account(
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        has_one = admin @ LedgerError::UnauthorizedAdmin,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        mut,
        close = admin,
        seeds = [ROLE_SEED, ledger.key().as_ref(), &[role as u8], holder.as_ref()],
        bump = role_grant.bump,
        has_one = ledger @ LedgerError::EntryMismatch,
        constraint = role_grant.holder == holder @ LedgerError::EntryMismatch,
    )]
    pub role_grant: Account<'info, RoleGrant>,

    #[account(mut)]
    pub admin: Signer<'info>,
}

#[event]
pub struct RoleRevoked {
    pub admin: Pubkey,
    pub role: Role,
    pub holder: Pubkey,
}

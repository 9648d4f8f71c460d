use anchor_lang::prelude::*;

use crate::constants::LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::{AuthorityKind, LedgerState};

pub fn set_authority(ctx: Context<SetAuthority>, kind: AuthorityKind, new_authority: Pubkey) -> Result<()> {
    require!(new_authority != Pubkey::default(), LedgerError::InvalidPubkey);

    let ledger_key = ctx.accounts.ledger.key();
    require!(new_authority != ledger_key, LedgerError::InvalidConfig);
    require!(new_authority != crate::ID, LedgerError::InvalidConfig);

    let l = &mut ctx.accounts.ledger;
    let slot = match kind {
        AuthorityKind::Migrator => &mut l.migrator,
        AuthorityKind::Funder => &mut l.funder,
    };
    let old_authority = *slot;
    *slot = new_authority;

    emit!(AuthoritySet {
        admin: l.admin,
        kind,
        old_authority,
        new_authority,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetAuthority<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        has_one = admin @ LedgerError::UnauthorizedAdmin,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    pub admin: Signer<'info>,
}

#[event]
pub struct AuthoritySet {
    pub admin: Pubkey,
    pub kind: AuthorityKind,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
}

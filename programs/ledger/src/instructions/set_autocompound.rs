use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

pub fn set_autocompound(ctx: Context<SetAutocompound>, enabled: bool) -> Result<()> {
    let position = &mut ctx.accounts.position;
    position.autocompound = enabled;

    emit!(AutocompoundToggled {
        owner: position.owner,
        enabled,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetAutocompound<'info> {
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

    pub owner: Signer<'info>,
}

#[event]
pub struct AutocompoundToggled {
    pub owner: Pubkey,
    pub enabled: bool,
}

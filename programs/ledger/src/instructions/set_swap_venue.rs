use anchor_lang::prelude::*;

use crate::constants::LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::LedgerState;

pub fn set_swap_venue(ctx: Context<SetSwapVenue>, swap_program: Pubkey, swap_authority: Pubkey) -> Result<()> {
    require!(swap_program != Pubkey::default(), LedgerError::InvalidPubkey);
    require!(swap_authority != Pubkey::default(), LedgerError::InvalidPubkey);
    require!(swap_program != crate::ID, LedgerError::InvalidSwapVenue);
    require!(
        swap_authority != ctx.accounts.ledger.key(),
        LedgerError::InvalidSwapVenue
    );

    let l = &mut ctx.accounts.ledger;
    let old_program = l.swap_program;
    l.swap_program = swap_program;
    l.swap_authority = swap_authority;

    emit!(SwapVenueSet {
        admin: l.admin,
        old_program,
        swap_program,
        swap_authority,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetSwapVenue<'info> {
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
pub struct SwapVenueSet {
    pub admin: Pubkey,
    pub old_program: Pubkey,
    pub swap_program: Pubkey,
    pub swap_authority: Pubkey,
}

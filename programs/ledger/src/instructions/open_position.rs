use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
    let ledger = ctx.accounts.ledger.key();
    let owner = ctx.accounts.owner.key();
    ctx.accounts
        .position
        .ensure_initialized(ledger, owner, ctx.bumps.position);

    emit!(PositionOpened {
        ledger,
        owner,
        position: ctx.accounts.position.key(),
    });
    Ok(())
}

#[derive(Accounts)]
pub struct OpenPosition<'info> {
    #[account(
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        init,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, ledger.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct PositionOpened {
    pub ledger: Pubkey,
    pub owner: Pubkey,
    pub position: Pubkey,
}

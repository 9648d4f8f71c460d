use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, POSITION_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

/// Move free shares, together with their reward debt, to another owner.
pub fn transfer_shares(ctx: Context<TransferShares>, recipient: Pubkey, amount: u64) -> Result<()> {
    require!(recipient != Pubkey::default(), LedgerError::InvalidPubkey);

    let ledger_key = ctx.accounts.ledger.key();
    let to = &mut ctx.accounts.recipient_position;
    to.ensure_initialized(ledger_key, recipient, ctx.bumps.recipient_position);

    let from = &mut ctx.accounts.position;
    ctx.accounts.ledger.move_free(from, to, amount)?;

    emit!(SharesTransferred {
        from: from.owner,
        to: recipient,
        amount,
        from_free_shares: from.free_shares,
        to_free_shares: to.free_shares,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct TransferShares<'info> {
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
        constraint = recipient != owner.key() @ LedgerError::SelfTransfer,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, ledger.key().as_ref(), recipient.as_ref()],
        bump
    )]
    pub recipient_position: Box<Account<'info, Position>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct SharesTransferred {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub from_free_shares: u64,
    pub to_free_shares: u64,
}

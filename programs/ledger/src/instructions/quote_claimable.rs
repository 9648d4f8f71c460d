use anchor_lang::prelude::*;

use crate::constants::LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};

/// Pending reward of every position in `remaining_accounts`, and their sum.
pub fn quote_claimable<'info>(ctx: Context<'_, '_, 'info, 'info, QuoteClaimable<'info>>) -> Result<u64> {
    let l = &ctx.accounts.ledger;
    let ledger_key = l.key();

    let mut positions: Vec<Account<'info, Position>> = Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts {
        let position: Account<'info, Position> = Account::try_from(info)?;
        require_keys_eq!(position.ledger, ledger_key, LedgerError::EntryMismatch);
        positions.push(position);
    }
    let refs: Vec<&Position> = positions.iter().map(|p| &**p).collect();
    let (amounts, total) = l.claimable_many(&refs)?;
    let owners: Vec<Pubkey> = positions.iter().map(|p| p.owner).collect();

    emit!(ClaimableQuote {
        owners,
        amounts,
        total,
        acc_reward_per_share: l.acc_reward_per_share,
    });
    Ok(total)
}

#[derive(Accounts)]
pub struct QuoteClaimable<'info> {
    #[account(seeds = [LEDGER_SEED], bump = ledger.bump)]
    pub ledger: Box<Account<'info, LedgerState>>,
}

#[event]
pub struct ClaimableQuote {
    pub owners: Vec<Pubkey>,
    pub amounts: Vec<u64>,
    pub total: u64,
    pub acc_reward_per_share: u128,
}

use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;
use anchor_spl::token::{Token, TokenAccount};

use crate::compound;
use crate::constants::{LEDGER_SEED, MAX_BATCH_COMPOUND, ROLE_SEED};
use crate::error::LedgerError;
use crate::state::{LedgerState, Position, Role, RoleGrant};
use crate::swap::{route_digest, CpiSwapVenue};

/// Operator-driven compounding for many positions with a single swap.
///
/// `remaining_accounts`: `member_count` writable positions, then the extra
/// accounts forwarded to the swap program. Zero-address and repeated keys are
/// skipped; positions that have not opted in settle nothing.
pub fn autocompound_batch<'info>(
    ctx: Context<'_, '_, 'info, 'info, AutocompoundBatch<'info>>,
    member_count: u8,
    min_amount_out: u64,
    routing_data: Vec<u8>,
) -> Result<()> {
    let member_count = member_count as usize;
    require!(member_count > 0, LedgerError::EmptyBatch);
    require!(member_count <= MAX_BATCH_COMPOUND, LedgerError::BatchTooLarge);
    require!(
        ctx.remaining_accounts.len() >= member_count,
        LedgerError::EntryWindowShort
    );
    let (member_infos, route_accounts) = ctx.remaining_accounts.split_at(member_count);

    let ledger_key = ctx.accounts.ledger.key();
    let candidates: Vec<(Pubkey, bool)> = member_infos
        .iter()
        .map(|info| (*info.key, info.is_writable))
        .collect();
    let picked = compound::select_members(&candidates)?;
    if picked.len() < member_count {
        msg!(
            "autocompound_batch: skipped {} zero or repeated keys",
            member_count - picked.len()
        );
    }
    let mut members: Vec<Account<'info, Position>> = Vec::with_capacity(picked.len());
    for i in picked {
        let position: Account<'info, Position> = Account::try_from(&member_infos[i])?;
        require_keys_eq!(position.ledger, ledger_key, LedgerError::EntryMismatch);
        members.push(position);
    }

    let ledger_ai = ctx.accounts.ledger.to_account_info();
    let ledger_bump = ctx.accounts.ledger.bump;
    let reward_vault_ai = ctx.accounts.reward_vault.to_account_info();
    let swap_program_ai = ctx.accounts.swap_program.to_account_info();
    let swap_authority_ai = ctx.accounts.swap_authority.to_account_info();
    let token_program_ai = ctx.accounts.token_program.to_account_info();

    let mut venue = CpiSwapVenue {
        ledger: ledger_ai,
        ledger_bump,
        reward_vault: reward_vault_ai,
        principal_vault: &mut *ctx.accounts.principal_vault,
        swap_program: swap_program_ai,
        swap_authority: swap_authority_ai,
        token_program: token_program_ai,
        route_accounts,
    };
    let mut refs: Vec<&mut Position> = members.iter_mut().map(|m| &mut **m).collect();
    let outcome = compound::autocompound_batch(
        &mut ctx.accounts.ledger,
        &mut refs,
        &mut venue,
        min_amount_out,
        &routing_data,
    )?;
    drop(refs);

    for (i, member) in members.iter().enumerate() {
        member.exit(&crate::ID)?;
        if outcome.pendings[i] > 0 {
            emit!(MemberCompounded {
                owner: member.owner,
                pending: outcome.pendings[i],
                shares: outcome.shares[i],
            });
        }
    }

    emit!(BatchAutocompounded {
        operator: ctx.accounts.operator.key(),
        members: members.len() as u8,
        total_pending: outcome.total_pending,
        received: outcome.receipt.received,
        reported: outcome.receipt.reported,
        minted: outcome.minted,
        dust: outcome.dust,
        route_digest: route_digest(&routing_data),
    });
    Ok(())
}

#[derive(Accounts)]
pub struct AutocompoundBatch<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        constraint = !ledger.busy @ LedgerError::ReentrantCall,
    )]
    pub ledger: Box<Account<'info, LedgerState>>,

    #[account(
        seeds = [
            ROLE_SEED,
            ledger.key().as_ref(),
            &[Role::Operator as u8],
            operator.key().as_ref(),
        ],
        bump = operator_role.bump,
    )]
    pub operator_role: Box<Account<'info, RoleGrant>>,

    #[account(
        mut,
        address = ledger.reward_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        address = ledger.principal_vault @ LedgerError::InvalidTokenAccount,
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: Matched against the configured swap program; invoked via CPI.
    #[account(
        executable,
        address = ledger.swap_program @ LedgerError::InvalidSwapVenue,
    )]
    pub swap_program: UncheckedAccount<'info>,

    /// CHECK: Matched against the configured swap authority; only approved as a delegate.
    #[account(address = ledger.swap_authority @ LedgerError::InvalidSwapVenue)]
    pub swap_authority: UncheckedAccount<'info>,

    pub operator: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct MemberCompounded {
    pub owner: Pubkey,
    pub pending: u64,
    pub shares: u64,
}

#[event]
pub struct BatchAutocompounded {
    pub operator: Pubkey,
    pub members: u8,
    pub total_pending: u64,
    pub received: u64,
    pub reported: u64,
    pub minted: u64,
    pub dust: u64,
    pub route_digest: [u8; 32],
}

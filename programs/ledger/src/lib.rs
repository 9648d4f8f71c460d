use anchor_lang::prelude::*;

pub mod compound;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod registry;
pub mod state;
pub mod swap;
pub mod utils;

#[cfg(test)]
mod testing;

pub use instructions::*;
use state::{AuthorityKind, CooldownSource, LedgerParams, LockClass, Role, VestingPool};

declare_id!("3XrtzLoM1NjhFFce8bM2bzG4neGkqKtQ5i46zH56P89s");

#[program]
pub mod staking_ledger {
    use super::*;

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    pub fn initialize_ledger(
        ctx: Context<InitializeLedger>,
        params: LedgerParams,
        migrator: Pubkey,
        funder: Pubkey,
        swap_program: Pubkey,
        swap_authority: Pubkey,
    ) -> Result<()> {
        instructions::initialize_ledger::initialize_ledger(
            ctx,
            params,
            migrator,
            funder,
            swap_program,
            swap_authority,
        )
    }

    pub fn set_authority(ctx: Context<SetAuthority>, kind: AuthorityKind, new_authority: Pubkey) -> Result<()> {
        instructions::set_authority::set_authority(ctx, kind, new_authority)
    }

    pub fn set_swap_venue(ctx: Context<SetSwapVenue>, swap_program: Pubkey, swap_authority: Pubkey) -> Result<()> {
        instructions::set_swap_venue::set_swap_venue(ctx, swap_program, swap_authority)
    }

    pub fn grant_role(ctx: Context<GrantRole>, role: Role, holder: Pubkey) -> Result<()> {
        instructions::grant_role::grant_role(ctx, role, holder)
    }

    pub fn revoke_role(ctx: Context<RevokeRole>, role: Role, holder: Pubkey) -> Result<()> {
        instructions::revoke_role::revoke_role(ctx, role, holder)
    }

    // -----------------------------------------------------------------
    // Shares and rewards
    // -----------------------------------------------------------------

    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        instructions::open_position::open_position(ctx)
    }

    pub fn set_autocompound(ctx: Context<SetAutocompound>, enabled: bool) -> Result<()> {
        instructions::set_autocompound::set_autocompound(ctx, enabled)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake::stake(ctx, amount)
    }

    pub fn transfer_shares(ctx: Context<TransferShares>, recipient: Pubkey, amount: u64) -> Result<()> {
        instructions::transfer_shares::transfer_shares(ctx, recipient, amount)
    }

    pub fn deposit_rewards(ctx: Context<DepositRewards>, amount: u64) -> Result<()> {
        instructions::deposit_rewards::deposit_rewards(ctx, amount)
    }

    pub fn claim_rewards(ctx: Context<ClaimRewards>) -> Result<u64> {
        instructions::claim_rewards::claim_rewards(ctx)
    }

    // -----------------------------------------------------------------
    // Locks and vesting
    // -----------------------------------------------------------------

    pub fn credit_fixed_lock(
        ctx: Context<CreditFixedLock>,
        beneficiary: Pubkey,
        amount: u64,
        class: LockClass,
        index: u32,
    ) -> Result<()> {
        instructions::credit_fixed_lock::credit_fixed_lock(ctx, beneficiary, amount, class, index)
    }

    pub fn credit_vesting(ctx: Context<CreditVesting>, beneficiary: Pubkey, amount: u64, index: u32) -> Result<()> {
        instructions::credit_vesting::credit_vesting(ctx, beneficiary, amount, index)
    }

    pub fn credit_contributor_vesting(
        ctx: Context<CreditContributorVesting>,
        beneficiary: Pubkey,
        amount: u64,
        index: u32,
    ) -> Result<()> {
        instructions::credit_contributor_vesting::credit_contributor_vesting(ctx, beneficiary, amount, index)
    }

    pub fn unlock_fixed<'info>(
        ctx: Context<'_, '_, 'info, 'info, UnlockFixed<'info>>,
        class: LockClass,
        max_entries: u32,
        cooldown_index: u32,
    ) -> Result<()> {
        instructions::unlock_fixed::unlock_fixed(ctx, class, max_entries, cooldown_index)
    }

    pub fn unlock_vesting<'info>(
        ctx: Context<'_, '_, 'info, 'info, UnlockVesting<'info>>,
        pool: VestingPool,
        max_schedules: u32,
        cooldown_index: u32,
    ) -> Result<()> {
        instructions::unlock_vesting::unlock_vesting(ctx, pool, max_schedules, cooldown_index)
    }

    pub fn restake_fixed<'info>(
        ctx: Context<'_, '_, 'info, 'info, RestakeFixed<'info>>,
        class: LockClass,
        max_entries: u32,
    ) -> Result<()> {
        instructions::restake_fixed::restake_fixed(ctx, class, max_entries)
    }

    pub fn restake_vesting<'info>(
        ctx: Context<'_, '_, 'info, 'info, RestakeVesting<'info>>,
        pool: VestingPool,
        max_schedules: u32,
    ) -> Result<()> {
        instructions::restake_vesting::restake_vesting(ctx, pool, max_schedules)
    }

    pub fn quote_unlockable<'info>(
        ctx: Context<'_, '_, 'info, 'info, QuoteUnlockable<'info>>,
        counts: [u8; 4],
        max_schedules: [u32; 2],
    ) -> Result<u64> {
        instructions::quote_unlockable::quote_unlockable(ctx, counts, max_schedules)
    }

    // -----------------------------------------------------------------
    // Cooldown queues
    // -----------------------------------------------------------------

    pub fn request_withdrawal(ctx: Context<RequestWithdrawal>, amount: u64, index: u32) -> Result<()> {
        instructions::request_withdrawal::request_withdrawal(ctx, amount, index)
    }

    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        source: CooldownSource,
        max_requests: u32,
    ) -> Result<u64> {
        instructions::withdraw::withdraw(ctx, source, max_requests)
    }

    // -----------------------------------------------------------------
    // Autocompound
    // -----------------------------------------------------------------

    pub fn autocompound<'info>(
        ctx: Context<'_, '_, 'info, 'info, Autocompound<'info>>,
        min_amount_out: u64,
        routing_data: Vec<u8>,
    ) -> Result<()> {
        instructions::autocompound::autocompound(ctx, min_amount_out, routing_data)
    }

    pub fn autocompound_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, AutocompoundBatch<'info>>,
        member_count: u8,
        min_amount_out: u64,
        routing_data: Vec<u8>,
    ) -> Result<()> {
        instructions::autocompound_batch::autocompound_batch(ctx, member_count, min_amount_out, routing_data)
    }

    pub fn quote_claimable<'info>(ctx: Context<'_, '_, 'info, 'info, QuoteClaimable<'info>>) -> Result<u64> {
        instructions::quote_claimable::quote_claimable(ctx)
    }
}

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::LedgerError;
use crate::state::entries::{LockClass, VestingPool};
use crate::state::position::Position;
use crate::utils::math::{accrued, reward_per_share};

/// Durations and scan bounds fixed at initialization.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct LedgerParams {
    /// Lock duration per `LockClass`.
    pub lock_durations: [i64; 2],
    /// Cliff per `VestingPool`.
    pub vesting_cliffs: [i64; 2],
    /// Linear release duration per `VestingPool`.
    pub vesting_durations: [i64; 2],
    /// Shared by all four cooldown queues.
    pub cooldown_delay: i64,
    /// Vesting schedules visited when the caller passes `max_schedules = 0`.
    pub default_vesting_window: u16,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            lock_durations: [DEFAULT_STANDARD_LOCK_SECS, DEFAULT_EXTENDED_LOCK_SECS],
            vesting_cliffs: [DEFAULT_MIGRATION_CLIFF_SECS, DEFAULT_CONTRIBUTOR_CLIFF_SECS],
            vesting_durations: [
                DEFAULT_MIGRATION_VESTING_SECS,
                DEFAULT_CONTRIBUTOR_VESTING_SECS,
            ],
            cooldown_delay: DEFAULT_COOLDOWN_SECS,
            default_vesting_window: DEFAULT_VESTING_WINDOW,
        }
    }
}

impl LedgerParams {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.lock_durations.iter().all(|d| *d > 0),
            LedgerError::InvalidConfig
        );
        require!(
            self.lock_durations[LockClass::Standard as usize]
                != self.lock_durations[LockClass::Extended as usize],
            LedgerError::InvalidConfig
        );
        require!(
            self.vesting_cliffs.iter().all(|c| *c >= 0),
            LedgerError::InvalidConfig
        );
        require!(
            self.vesting_durations.iter().all(|d| *d > 0),
            LedgerError::InvalidConfig
        );
        require!(self.cooldown_delay >= 0, LedgerError::InvalidConfig);
        require!(self.default_vesting_window > 0, LedgerError::InvalidConfig);
        Ok(())
    }

    pub fn lock_duration(&self, class: LockClass) -> i64 {
        self.lock_durations[class as usize]
    }

    pub fn vesting_cliff(&self, pool: VestingPool) -> i64 {
        self.vesting_cliffs[pool as usize]
    }

    pub fn vesting_duration(&self, pool: VestingPool) -> i64 {
        self.vesting_durations[pool as usize]
    }
}

/// Global ledger state PDA.
/// Seeds: [b"ledger"]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct LedgerState {
    /// Configuration authority.
    pub admin: Pubkey,
    pub principal_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub principal_vault: Pubkey,
    pub reward_vault: Pubkey,
    /// Migration front-door; sole caller of migration credits.
    pub migrator: Pubkey,
    /// Sole caller of `deposit_rewards`.
    pub funder: Pubkey,
    /// Program invoked to convert rewards into principal.
    pub swap_program: Pubkey,
    /// Delegate approved on the reward vault for the duration of a swap.
    pub swap_authority: Pubkey,
    pub params: LedgerParams,
    /// Reward per share, scaled by `ACC_PRECISION`. Never decreases.
    pub acc_reward_per_share: u128,
    pub total_free_shares: u64,
    pub total_locked_shares: u64,
    /// Principal burned out of shares and waiting in cooldown queues.
    pub total_queued: u64,
    pub total_rewards_deposited: u64,
    /// Set for the duration of the swap CPI.
    pub busy: bool,
    pub bump: u8,
    pub principal_vault_bump: u8,
    pub reward_vault_bump: u8,
}

/// Role marker PDA; its existence grants the role.
/// Seeds: [b"role", ledger, role, holder]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct RoleGrant {
    pub ledger: Pubkey,
    pub holder: Pubkey,
    pub role: u8,
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// May call `autocompound_batch`.
    Operator = 0,
    /// May fund contributor-pool vesting from its own balance.
    Contributor = 1,
}

/// Collaborator slots settable by the admin.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityKind {
    Migrator,
    Funder,
}

impl LedgerState {
    pub fn total_shares(&self) -> Result<u64> {
        Ok(self
            .total_free_shares
            .checked_add(self.total_locked_shares)
            .ok_or(LedgerError::MathOverflow)?)
    }

    // ---------------------------------------------------------------------
    // Reentrancy guard
    // ---------------------------------------------------------------------

    pub fn enter(&mut self) -> Result<()> {
        require!(!self.busy, LedgerError::ReentrantCall);
        self.busy = true;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.busy = false;
    }

    // ---------------------------------------------------------------------
    // Reward accumulator
    // ---------------------------------------------------------------------

    /// Spread `amount` over all outstanding shares.
    pub fn deposit_rewards(&mut self, amount: u64) -> Result<u128> {
        require!(amount > 0, LedgerError::ZeroAmount);
        let total = self.total_shares()?;
        require!(total > 0, LedgerError::NoShares);

        let increment = reward_per_share(amount, total)?;
        self.acc_reward_per_share = self
            .acc_reward_per_share
            .checked_add(increment)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_rewards_deposited = self
            .total_rewards_deposited
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(increment)
    }

    /// `floor(total_shares * acc / P) - reward_debt`, floored at zero.
    ///
    /// Floor rounding across separate debt adjustments can leave the debt a
    /// unit above the accrued value; that reads as zero pending, not an error.
    pub fn pending_of(&self, position: &Position) -> Result<u64> {
        let accumulated = accrued(position.total_shares()?, self.acc_reward_per_share)?;
        let pending = accumulated
            .checked_sub(position.reward_debt)
            .ok_or(LedgerError::MathOverflow)?;
        if pending <= 0 {
            return Ok(0);
        }
        Ok(u64::try_from(pending).map_err(|_| LedgerError::ValueOutOfRange)?)
    }

    /// Pending reward of each of `positions`, and their sum.
    pub fn claimable_many(&self, positions: &[&Position]) -> Result<(Vec<u64>, u64)> {
        let mut amounts = Vec::with_capacity(positions.len());
        let mut total: u64 = 0;
        for position in positions {
            let pending = self.pending_of(position)?;
            total = total.checked_add(pending).ok_or(LedgerError::MathOverflow)?;
            amounts.push(pending);
        }
        Ok((amounts, total))
    }

    /// Checkpoint `position` at the current accumulator and return what it was owed.
    pub fn settle(&self, position: &mut Position) -> Result<u64> {
        let pending = self.pending_of(position)?;
        position.reward_debt = accrued(position.total_shares()?, self.acc_reward_per_share)?;
        Ok(pending)
    }

    fn debt_for(&self, shares: u64) -> Result<i128> {
        accrued(shares, self.acc_reward_per_share)
    }

    // ---------------------------------------------------------------------
    // Share movements. Each moves reward debt by the accumulator value of
    // the shares moved, so balance changes neither create nor destroy pending.
    // ---------------------------------------------------------------------

    pub fn mint_free(&mut self, position: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        let debt = self.debt_for(amount)?;
        position.free_shares = position
            .free_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        position.reward_debt = position
            .reward_debt
            .checked_add(debt)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_free_shares = self
            .total_free_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    pub fn burn_free(&mut self, position: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        require!(
            position.free_shares >= amount,
            LedgerError::InsufficientFreeShares
        );
        let debt = self.debt_for(amount)?;
        position.free_shares -= amount;
        position.reward_debt = position
            .reward_debt
            .checked_sub(debt)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_free_shares = self
            .total_free_shares
            .checked_sub(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    pub fn increase_locked(&mut self, position: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        let debt = self.debt_for(amount)?;
        position.locked_shares = position
            .locked_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        position.reward_debt = position
            .reward_debt
            .checked_add(debt)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_locked_shares = self
            .total_locked_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    pub fn decrease_locked(&mut self, position: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        require!(
            position.locked_shares >= amount,
            LedgerError::InsufficientLockedShares
        );
        let debt = self.debt_for(amount)?;
        position.locked_shares -= amount;
        position.reward_debt = position
            .reward_debt
            .checked_sub(debt)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_locked_shares = self
            .total_locked_shares
            .checked_sub(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    /// Transfer-equivalent: free shares and their debt move from `from` to `to`.
    pub fn move_free(&self, from: &mut Position, to: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        require!(from.free_shares >= amount, LedgerError::InsufficientFreeShares);
        let debt = self.debt_for(amount)?;
        from.free_shares -= amount;
        from.reward_debt = from
            .reward_debt
            .checked_sub(debt)
            .ok_or(LedgerError::MathOverflow)?;
        to.free_shares = to
            .free_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        to.reward_debt = to
            .reward_debt
            .checked_add(debt)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    /// Re-stake unlocked principal: locked shares become free shares. Total
    /// shares and reward debt are unchanged.
    pub fn convert_locked_to_free(&mut self, position: &mut Position, amount: u64) -> Result<()> {
        require!(amount > 0, LedgerError::ZeroAmount);
        require!(
            position.locked_shares >= amount,
            LedgerError::InsufficientLockedShares
        );
        position.locked_shares -= amount;
        position.free_shares = position
            .free_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_locked_shares = self
            .total_locked_shares
            .checked_sub(amount)
            .ok_or(LedgerError::MathOverflow)?;
        self.total_free_shares = self
            .total_free_shares
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Cooldown bookkeeping
    // ---------------------------------------------------------------------

    pub fn queue_principal(&mut self, amount: u64) -> Result<()> {
        self.total_queued = self
            .total_queued
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    pub fn release_queued(&mut self, amount: u64) -> Result<()> {
        self.total_queued = self
            .total_queued
            .checked_sub(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    /// Maturity of a cooldown request made at `now`.
    pub fn cooldown_maturity(&self, now: i64) -> Result<i64> {
        Ok(now
            .checked_add(self.params.cooldown_delay)
            .ok_or(LedgerError::MathOverflow)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_ledger_err;

    fn ledger() -> LedgerState {
        LedgerState {
            params: LedgerParams::default(),
            ..Default::default()
        }
    }

    fn identity_holds(l: &LedgerState, positions: &[&Position]) {
        let mut sum: u64 = 0;
        for p in positions {
            assert_eq!(p.total_shares().unwrap(), p.free_shares + p.locked_shares);
            sum += p.total_shares().unwrap();
        }
        assert_eq!(sum, l.total_shares().unwrap());
        assert_eq!(l.total_shares().unwrap(), l.total_free_shares + l.total_locked_shares);
    }

    #[test]
    fn default_params_validate() {
        LedgerParams::default().validate().unwrap();
        let mut p = LedgerParams::default();
        p.vesting_durations[1] = 0;
        assert_ledger_err(p.validate(), LedgerError::InvalidConfig);
        let mut p = LedgerParams::default();
        p.lock_durations = [10, 10];
        assert_ledger_err(p.validate(), LedgerError::InvalidConfig);
        let mut p = LedgerParams::default();
        p.default_vesting_window = 0;
        assert_ledger_err(p.validate(), LedgerError::InvalidConfig);
    }

    #[test]
    fn deposit_requires_amount_and_shares() {
        let mut l = ledger();
        assert_ledger_err(l.deposit_rewards(100), LedgerError::NoShares);
        let mut p = Position::default();
        l.mint_free(&mut p, 1).unwrap();
        assert_ledger_err(l.deposit_rewards(0), LedgerError::ZeroAmount);
        assert_eq!(l.acc_reward_per_share, 0);
    }

    #[test]
    fn rewards_split_by_share_weight() {
        let mut l = ledger();
        let mut x = Position::default();
        let mut y = Position::default();
        l.mint_free(&mut x, 1).unwrap();
        l.increase_locked(&mut y, 3).unwrap();

        l.deposit_rewards(100).unwrap();
        assert_eq!(l.pending_of(&x).unwrap(), 25);
        assert_eq!(l.pending_of(&y).unwrap(), 75);
        assert_eq!(l.pending_of(&x).unwrap() + l.pending_of(&y).unwrap(), 100);
        identity_holds(&l, &[&x, &y]);
    }

    #[test]
    fn claimable_many_lists_each_position_and_the_total() {
        let mut l = ledger();
        let mut x = Position::default();
        let mut y = Position::default();
        l.mint_free(&mut x, 1).unwrap();
        l.mint_free(&mut y, 3).unwrap();
        l.deposit_rewards(100).unwrap();

        let (amounts, total) = l.claimable_many(&[&x, &y]).unwrap();
        assert_eq!(amounts, vec![25, 75]);
        assert_eq!(total, 100);

        l.settle(&mut x).unwrap();
        assert_eq!(l.claimable_many(&[&x, &y]).unwrap(), (vec![0, 75], 75));
        assert_eq!(l.claimable_many(&[]).unwrap(), (vec![], 0));
    }

    #[test]
    fn new_shares_start_with_zero_pending() {
        let mut l = ledger();
        let mut a = Position::default();
        l.mint_free(&mut a, 7).unwrap();
        l.deposit_rewards(700).unwrap();

        let mut b = Position::default();
        l.mint_free(&mut b, 13).unwrap();
        l.increase_locked(&mut b, 5).unwrap();
        assert_eq!(l.pending_of(&b).unwrap(), 0);
        assert_eq!(l.pending_of(&a).unwrap(), 700);
    }

    #[test]
    fn burning_preserves_accrued_pending() {
        let mut l = ledger();
        let mut a = Position::default();
        let mut b = Position::default();
        l.mint_free(&mut a, 10).unwrap();
        l.mint_free(&mut b, 10).unwrap();
        l.deposit_rewards(200).unwrap();

        l.burn_free(&mut a, 4).unwrap();
        assert_eq!(l.pending_of(&a).unwrap(), 100);
        l.increase_locked(&mut a, 6).unwrap();
        l.decrease_locked(&mut a, 6).unwrap();
        assert_eq!(l.pending_of(&a).unwrap(), 100);
        identity_holds(&l, &[&a, &b]);

        assert_ledger_err(l.burn_free(&mut a, 7), LedgerError::InsufficientFreeShares);
        assert_ledger_err(l.decrease_locked(&mut a, 1), LedgerError::InsufficientLockedShares);
    }

    #[test]
    fn settle_checkpoints_and_returns_pending() {
        let mut l = ledger();
        let mut a = Position::default();
        l.mint_free(&mut a, 3).unwrap();
        l.deposit_rewards(10).unwrap();
        // floor(3 * floor(10e24 / 3) / 1e24) = 9
        assert_eq!(l.settle(&mut a).unwrap(), 9);
        assert_eq!(l.settle(&mut a).unwrap(), 0);
        assert_eq!(l.pending_of(&a).unwrap(), 0);
    }

    #[test]
    fn transfer_conserves_pending_within_one_unit() {
        let mut l = ledger();
        let mut a = Position::default();
        let mut b = Position::default();
        l.mint_free(&mut a, 7).unwrap();
        l.mint_free(&mut b, 5).unwrap();
        l.deposit_rewards(1_001).unwrap();
        l.deposit_rewards(333).unwrap();

        let before = l.pending_of(&a).unwrap() + l.pending_of(&b).unwrap();
        l.move_free(&mut a, &mut b, 3).unwrap();
        let after = l.pending_of(&a).unwrap() + l.pending_of(&b).unwrap();
        assert!(before.abs_diff(after) <= 1, "before {before} after {after}");
        identity_holds(&l, &[&a, &b]);

        assert_ledger_err(l.move_free(&mut a, &mut b, 5), LedgerError::InsufficientFreeShares);
        assert_ledger_err(l.move_free(&mut a, &mut b, 0), LedgerError::ZeroAmount);
    }

    #[test]
    fn pending_clamps_to_zero_when_debt_exceeds_accrual() {
        let l = ledger();
        let p = Position {
            free_shares: 1,
            reward_debt: 5,
            ..Default::default()
        };
        assert_eq!(l.pending_of(&p).unwrap(), 0);
    }

    #[test]
    fn convert_locked_to_free_keeps_totals_and_debt() {
        let mut l = ledger();
        let mut a = Position::default();
        l.increase_locked(&mut a, 40).unwrap();
        l.deposit_rewards(80).unwrap();
        let debt = a.reward_debt;
        let total = l.total_shares().unwrap();

        l.convert_locked_to_free(&mut a, 15).unwrap();
        assert_eq!(a.locked_shares, 25);
        assert_eq!(a.free_shares, 15);
        assert_eq!(a.reward_debt, debt);
        assert_eq!(l.total_shares().unwrap(), total);
        assert_eq!(l.pending_of(&a).unwrap(), 80);
        identity_holds(&l, &[&a]);
    }

    #[test]
    fn guard_rejects_nested_entry() {
        let mut l = ledger();
        l.enter().unwrap();
        assert_ledger_err(l.enter(), LedgerError::ReentrantCall);
        l.leave();
        l.enter().unwrap();
    }

    #[test]
    fn queued_principal_balances() {
        let mut l = ledger();
        l.queue_principal(30).unwrap();
        l.release_queued(12).unwrap();
        assert_eq!(l.total_queued, 18);
        assert!(l.release_queued(19).is_err());
    }
}

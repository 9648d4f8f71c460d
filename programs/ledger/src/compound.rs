//! Autocompound: settle pending rewards, swap them for principal once, and
//! mint the principal actually received as free shares.
//!
//! Receipt is measured as the delta of the ledger's principal vault around the
//! swap. Batch distribution floors each slice, so the minted sum never exceeds
//! what arrived; the remainder stays in the vault unminted.

use anchor_lang::prelude::*;

use crate::constants::MAX_BATCH_COMPOUND;
use crate::error::LedgerError;
use crate::state::{LedgerState, Position};
use crate::swap::SwapVenue;
use crate::utils::math::pro_rata;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapReceipt {
    /// Principal that actually reached the vault.
    pub received: u64,
    /// What the venue claimed to deliver.
    pub reported: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompoundOutcome {
    pub pending: u64,
    pub receipt: SwapReceipt,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Settled reward per member, by index; zero for skipped members.
    pub pendings: Vec<u64>,
    /// Free shares minted per member, by index.
    pub shares: Vec<u64>,
    pub total_pending: u64,
    pub receipt: SwapReceipt,
    pub minted: u64,
    /// Received principal left unminted by floor division.
    pub dust: u64,
}

/// Compound one position's pending reward into free shares.
pub fn autocompound<V: SwapVenue>(
    ledger: &mut LedgerState,
    position: &mut Position,
    venue: &mut V,
    min_out: u64,
    routing: &[u8],
) -> Result<CompoundOutcome> {
    ledger.enter()?;
    let outcome = compound_one(ledger, position, venue, min_out, routing);
    ledger.leave();
    outcome
}

/// Indexes of the batch candidates to compound, given each candidate's key and
/// whether it was passed writable. The zero address and repeats of an earlier
/// key are skipped; every member kept must be writable.
pub fn select_members(candidates: &[(Pubkey, bool)]) -> Result<Vec<usize>> {
    let mut seen: Vec<&Pubkey> = Vec::with_capacity(candidates.len());
    let mut picked = Vec::with_capacity(candidates.len());
    for (i, (key, writable)) in candidates.iter().enumerate() {
        if *key == Pubkey::default() || seen.contains(&key) {
            continue;
        }
        require!(*writable, LedgerError::AccountNotWritable);
        seen.push(key);
        picked.push(i);
    }
    Ok(picked)
}

/// Compound every opted-in member with a single swap of the pooled pending.
///
/// Members must be distinct positions; callers drop duplicates and
/// placeholder keys before building the slice.
pub fn autocompound_batch<V: SwapVenue>(
    ledger: &mut LedgerState,
    members: &mut [&mut Position],
    venue: &mut V,
    min_out: u64,
    routing: &[u8],
) -> Result<BatchOutcome> {
    require!(!members.is_empty(), LedgerError::EmptyBatch);
    require!(
        members.len() <= MAX_BATCH_COMPOUND,
        LedgerError::BatchTooLarge
    );
    ledger.enter()?;
    let outcome = compound_many(ledger, members, venue, min_out, routing);
    ledger.leave();
    outcome
}

/// `floor(received * pending_i / total_pending)` for each member.
pub fn distribute_pro_rata(received: u64, pendings: &[u64], total_pending: u64) -> Result<Vec<u64>> {
    require!(total_pending > 0, LedgerError::NothingToCompound);
    pendings
        .iter()
        .map(|&pending| pro_rata(received, pending, total_pending))
        .collect()
}

fn compound_one<V: SwapVenue>(
    ledger: &mut LedgerState,
    position: &mut Position,
    venue: &mut V,
    min_out: u64,
    routing: &[u8],
) -> Result<CompoundOutcome> {
    let pending = ledger.settle(position)?;
    require!(pending > 0, LedgerError::NothingToCompound);

    let receipt = swap_measured(ledger, venue, pending, min_out, routing)?;
    ledger.mint_free(position, receipt.received)?;

    Ok(CompoundOutcome { pending, receipt })
}

fn compound_many<V: SwapVenue>(
    ledger: &mut LedgerState,
    members: &mut [&mut Position],
    venue: &mut V,
    min_out: u64,
    routing: &[u8],
) -> Result<BatchOutcome> {
    let mut pendings = Vec::with_capacity(members.len());
    let mut total_pending: u64 = 0;
    for member in members.iter_mut() {
        let pending = if member.autocompound {
            ledger.settle(&mut **member)?
        } else {
            0
        };
        total_pending = total_pending
            .checked_add(pending)
            .ok_or(LedgerError::MathOverflow)?;
        pendings.push(pending);
    }
    require!(total_pending > 0, LedgerError::NothingToCompound);

    let receipt = swap_measured(ledger, venue, total_pending, min_out, routing)?;
    let shares = distribute_pro_rata(receipt.received, &pendings, total_pending)?;

    let mut minted: u64 = 0;
    for (member, &share) in members.iter_mut().zip(shares.iter()) {
        if share == 0 {
            continue;
        }
        ledger.mint_free(&mut **member, share)?;
        minted = minted.checked_add(share).ok_or(LedgerError::MathOverflow)?;
    }
    let dust = receipt
        .received
        .checked_sub(minted)
        .ok_or(LedgerError::MathOverflow)?;

    Ok(BatchOutcome {
        pendings,
        shares,
        total_pending,
        receipt,
        minted,
        dust,
    })
}

fn swap_measured<V: SwapVenue>(
    ledger: &LedgerState,
    venue: &mut V,
    amount_in: u64,
    min_out: u64,
    routing: &[u8],
) -> Result<SwapReceipt> {
    let before = venue.principal_balance()?;
    let reported = venue.swap(ledger, amount_in, min_out, routing)?;
    let after = venue.principal_balance()?;

    let received = after.saturating_sub(before);
    require!(
        received > 0 && received >= min_out,
        LedgerError::SlippageExceeded
    );
    if reported != received {
        msg!(
            "swap venue reported {} but vault received {}",
            reported,
            received
        );
    }
    Ok(SwapReceipt { received, reported })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LedgerParams;
    use crate::testing::assert_ledger_err;

    /// Venue that credits `pays` to the vault and claims `reports`.
    struct MockVenue {
        vault: u64,
        pays: u64,
        reports: u64,
        calls: Vec<(u64, u64)>,
        saw_guard: bool,
    }

    impl MockVenue {
        fn paying(pays: u64) -> Self {
            Self {
                vault: 1_000,
                pays,
                reports: pays,
                calls: Vec::new(),
                saw_guard: false,
            }
        }
    }

    impl SwapVenue for MockVenue {
        fn principal_balance(&mut self) -> Result<u64> {
            Ok(self.vault)
        }

        fn swap(&mut self, ledger: &LedgerState, amount_in: u64, min_out: u64, _routing: &[u8]) -> Result<u64> {
            self.saw_guard = ledger.busy;
            self.calls.push((amount_in, min_out));
            self.vault += self.pays;
            Ok(self.reports)
        }
    }

    fn ledger() -> LedgerState {
        LedgerState {
            params: LedgerParams::default(),
            ..Default::default()
        }
    }

    fn opted_in() -> Position {
        Position {
            autocompound: true,
            ..Default::default()
        }
    }

    #[test]
    fn member_selection_skips_zero_and_repeated_keys() {
        let x = Pubkey::new_unique();
        let y = Pubkey::new_unique();
        let picked = select_members(&[(x, true), (x, true), (Pubkey::default(), false), (y, true)]).unwrap();
        assert_eq!(picked, vec![0, 3]);
        assert_eq!(select_members(&[]).unwrap(), Vec::<usize>::new());
        // a read-only repeat is skipped before writability is checked
        assert_eq!(select_members(&[(y, true), (y, false)]).unwrap(), vec![0]);
        assert_ledger_err(
            select_members(&[(x, true), (y, false)]),
            LedgerError::AccountNotWritable,
        );
    }

    #[test]
    fn repeated_member_is_credited_once() {
        let mut l = ledger();
        let mut x = opted_in();
        let mut y = opted_in();
        l.mint_free(&mut x, 1).unwrap();
        l.mint_free(&mut y, 3).unwrap();
        l.deposit_rewards(100).unwrap();

        let kx = Pubkey::new_unique();
        let ky = Pubkey::new_unique();
        let picked = select_members(&[(kx, true), (kx, true), (Pubkey::default(), true), (ky, true)]).unwrap();
        let mut pool = [Some(&mut x), None, None, Some(&mut y)];
        let mut members: Vec<&mut Position> = picked.iter().filter_map(|&i| pool[i].take()).collect();
        assert_eq!(members.len(), 2);

        let mut venue = MockVenue::paying(200);
        let out = autocompound_batch(&mut l, &mut members, &mut venue, 1, b"r").unwrap();
        assert_eq!(out.pendings, vec![25, 75]);
        assert_eq!(out.total_pending, 100);
        assert_eq!(out.shares, vec![50, 150]);
        assert_eq!(venue.calls, vec![(100, 1)]);
        drop(members);
        assert_eq!(x.free_shares, 51);
        assert_eq!(y.free_shares, 153);
    }

    #[test]
    fn batch_distributes_pro_rata_and_keeps_dust() {
        let mut l = ledger();
        let mut x = opted_in();
        let mut y = opted_in();
        l.mint_free(&mut x, 1).unwrap();
        l.mint_free(&mut y, 2).unwrap();
        l.deposit_rewards(3).unwrap();
        assert_eq!(l.pending_of(&x).unwrap(), 1);
        assert_eq!(l.pending_of(&y).unwrap(), 2);

        let mut venue = MockVenue::paying(10);
        let out = autocompound_batch(&mut l, &mut [&mut x, &mut y], &mut venue, 10, b"r").unwrap();

        assert_eq!(venue.calls, vec![(3, 10)]);
        assert!(venue.saw_guard);
        assert!(!l.busy);
        assert_eq!(out.pendings, vec![1, 2]);
        assert_eq!(out.shares, vec![3, 6]);
        assert_eq!(out.total_pending, 3);
        assert_eq!(out.receipt.received, 10);
        assert_eq!(out.minted, 9);
        assert_eq!(out.dust, 1);
        assert_eq!(venue.vault, 1_010);

        assert_eq!(x.free_shares, 4);
        assert_eq!(y.free_shares, 8);
        assert_eq!(l.total_free_shares, 12);
        assert_eq!(l.pending_of(&x).unwrap(), 0);
        assert_eq!(l.pending_of(&y).unwrap(), 0);
    }

    #[test]
    fn batch_skips_members_not_opted_in() {
        let mut l = ledger();
        let mut x = opted_in();
        let mut y = Position::default();
        l.mint_free(&mut x, 1).unwrap();
        l.mint_free(&mut y, 1).unwrap();
        l.deposit_rewards(10).unwrap();

        let mut venue = MockVenue::paying(7);
        let out = autocompound_batch(&mut l, &mut [&mut x, &mut y], &mut venue, 0, b"").unwrap();
        assert_eq!(out.pendings, vec![5, 0]);
        assert_eq!(out.shares, vec![7, 0]);
        assert_eq!(out.dust, 0);
        assert_eq!(l.pending_of(&y).unwrap(), 5);
        assert_eq!(y.free_shares, 1);
    }

    #[test]
    fn batch_with_no_pending_fails_without_swapping() {
        let mut l = ledger();
        let mut x = opted_in();
        l.mint_free(&mut x, 5).unwrap();
        let mut venue = MockVenue::paying(10);
        assert_ledger_err(
            autocompound_batch(&mut l, &mut [&mut x], &mut venue, 0, b""),
            LedgerError::NothingToCompound,
        );
        assert!(venue.calls.is_empty());
        assert!(!l.busy);

        assert_ledger_err(
            autocompound_batch(&mut l, &mut [], &mut venue, 0, b""),
            LedgerError::EmptyBatch,
        );
    }

    #[test]
    fn reported_amount_is_ignored() {
        let mut l = ledger();
        let mut x = opted_in();
        l.mint_free(&mut x, 2).unwrap();
        l.deposit_rewards(8).unwrap();

        let mut venue = MockVenue::paying(5);
        venue.reports = 1_000_000;
        let out = autocompound(&mut l, &mut x, &mut venue, 5, b"").unwrap();
        assert_eq!(out.pending, 8);
        assert_eq!(out.receipt, SwapReceipt { received: 5, reported: 1_000_000 });
        assert_eq!(x.free_shares, 7);
    }

    #[test]
    fn short_payment_is_slippage() {
        let mut l = ledger();
        let mut x = opted_in();
        l.mint_free(&mut x, 2).unwrap();
        l.deposit_rewards(8).unwrap();

        let mut venue = MockVenue::paying(4);
        venue.reports = 100;
        assert_ledger_err(
            autocompound(&mut l, &mut x, &mut venue, 5, b""),
            LedgerError::SlippageExceeded,
        );
        assert!(!l.busy);

        let mut venue = MockVenue::paying(0);
        assert_ledger_err(
            autocompound(&mut l, &mut opted_in(), &mut venue, 0, b""),
            LedgerError::NothingToCompound,
        );
    }

    #[test]
    fn zero_delivery_is_rejected_even_with_zero_minimum() {
        let mut l = ledger();
        let mut x = opted_in();
        l.mint_free(&mut x, 1).unwrap();
        l.deposit_rewards(3).unwrap();
        let mut venue = MockVenue::paying(0);
        venue.reports = 3;
        assert_ledger_err(
            autocompound(&mut l, &mut x, &mut venue, 0, b""),
            LedgerError::SlippageExceeded,
        );
    }

    #[test]
    fn single_compound_mints_received_principal() {
        let mut l = ledger();
        let mut x = Position::default();
        let mut other = Position::default();
        l.mint_free(&mut x, 3).unwrap();
        l.mint_free(&mut other, 1).unwrap();
        l.deposit_rewards(40).unwrap();

        let mut venue = MockVenue::paying(12);
        let out = autocompound(&mut l, &mut x, &mut venue, 11, b"route").unwrap();
        assert_eq!(out.pending, 30);
        assert_eq!(venue.calls, vec![(30, 11)]);
        assert_eq!(x.free_shares, 15);
        assert_eq!(l.pending_of(&x).unwrap(), 0);
        assert_eq!(l.pending_of(&other).unwrap(), 10);
    }

    #[test]
    fn busy_ledger_refuses_compounding() {
        let mut l = ledger();
        let mut x = opted_in();
        l.mint_free(&mut x, 1).unwrap();
        l.deposit_rewards(1).unwrap();
        l.busy = true;
        let mut venue = MockVenue::paying(1);
        assert_ledger_err(
            autocompound(&mut l, &mut x, &mut venue, 0, b""),
            LedgerError::ReentrantCall,
        );
        assert!(venue.calls.is_empty());
    }

    #[test]
    fn pro_rata_never_over_mints() {
        let pendings = [7u64, 11, 13, 1];
        let total: u64 = pendings.iter().sum();
        for received in [1u64, 31, 32, 1_000, 999_999] {
            let shares = distribute_pro_rata(received, &pendings, total).unwrap();
            let minted: u64 = shares.iter().sum();
            assert!(minted <= received);
            assert!(received - minted < pendings.len() as u64);
        }
        let even = distribute_pro_rata(64, &[1, 3], 4).unwrap();
        assert_eq!(even, vec![16, 48]);
    }
}

//! Lock registry and cooldown queues over a position's entry tracks.
//!
//! Handlers create the entry accounts and load scan windows; everything that
//! touches balances, cursors and queued totals happens here.

use anchor_lang::prelude::*;

use crate::error::LedgerError;
use crate::state::{
    CooldownRequest, CooldownSource, FixedLock, LedgerState, LockClass, Position, Track,
    VestingPool, VestingSchedule,
};
use crate::utils::scan::{bounded_scan, preview_scan, ScanOutcome};

/// Append a fixed lock maturing one class duration from `now` and lock its shares.
#[allow(clippy::too_many_arguments)]
pub fn credit_fixed_lock(
    ledger: &mut LedgerState,
    position: &mut Position,
    entry: &mut FixedLock,
    position_key: Pubkey,
    class: LockClass,
    index: u32,
    amount: u64,
    now: i64,
) -> Result<()> {
    require!(amount > 0, LedgerError::ZeroAmount);
    let unlock_time = now
        .checked_add(ledger.params.lock_duration(class))
        .ok_or(LedgerError::MathOverflow)?;

    position.fixed_track_mut(class).push(index)?;
    ledger.increase_locked(position, amount)?;

    entry.position = position_key;
    entry.class = class as u8;
    entry.index = index;
    entry.amount = amount;
    entry.unlock_time = unlock_time;
    Ok(())
}

/// Append a schedule starting one pool cliff from `now` and lock its shares.
#[allow(clippy::too_many_arguments)]
pub fn credit_vesting(
    ledger: &mut LedgerState,
    position: &mut Position,
    entry: &mut VestingSchedule,
    position_key: Pubkey,
    pool: VestingPool,
    index: u32,
    amount: u64,
    now: i64,
) -> Result<()> {
    require!(amount > 0, LedgerError::ZeroAmount);
    let start_time = now
        .checked_add(ledger.params.vesting_cliff(pool))
        .ok_or(LedgerError::MathOverflow)?;

    position.vesting_track_mut(pool).push(index)?;
    ledger.increase_locked(position, amount)?;

    entry.position = position_key;
    entry.pool = pool as u8;
    entry.index = index;
    entry.total_amount = amount;
    entry.claimed = 0;
    entry.start_time = start_time;
    entry.duration = ledger.params.vesting_duration(pool);
    Ok(())
}

/// FIFO-consume matured locks of `class`. `window` starts at the track cursor.
pub fn consume_fixed_locks<'a, I>(
    position: &mut Position,
    class: LockClass,
    window: I,
    now: i64,
) -> Result<ScanOutcome>
where
    I: IntoIterator<Item = &'a mut FixedLock>,
{
    let track = position.fixed_track_mut(class);
    let outcome = bounded_scan(window, track.cursor, now)?;
    require!(outcome.released > 0, LedgerError::NothingUnlocked);
    track.advance_to(outcome.cursor)?;
    Ok(outcome)
}

/// Whether a window led by `first` drains fully vested schedules from the head.
pub fn drains_head(track: &Track, first: Option<&VestingSchedule>, now: i64) -> Result<bool> {
    match first {
        Some(schedule) if track.live() > 0 && schedule.index == track.head => {
            schedule.is_fully_vested(now)
        }
        _ => Ok(false),
    }
}

/// A rotating window must not hold an unreleased, fully vested schedule; those
/// are released in order from the head so that `head` can pass them.
fn check_rotation<'a, I>(window: I, now: i64) -> Result<()>
where
    I: IntoIterator<Item = &'a VestingSchedule>,
{
    for schedule in window {
        require!(
            schedule.is_exhausted() || !schedule.is_fully_vested(now)?,
            LedgerError::VestedScheduleOutOfTurn
        );
    }
    Ok(())
}

/// Round-robin release over `window`, laid out by `Track::rotation_window`.
///
/// A draining window moves `head` past the schedules it exhausts and leaves the
/// rotation cursor alone; a rotating window advances the cursor by its length.
pub fn consume_vesting<'a, I>(
    position: &mut Position,
    pool: VestingPool,
    window: I,
    now: i64,
) -> Result<ScanOutcome>
where
    I: IntoIterator<Item = &'a mut VestingSchedule>,
{
    let track = position.vesting_track_mut(pool);
    require!(track.live() > 0, LedgerError::NothingUnlocked);

    let mut window: Vec<&'a mut VestingSchedule> = window.into_iter().collect();
    let draining = drains_head(track, window.first().map(|s| &**s), now)?;
    if !draining {
        check_rotation(window.iter().map(|s| &**s), now)?;
    }

    let outcome = bounded_scan(window.iter_mut().map(|s| &mut **s), track.cursor, now)?;
    require!(outcome.released > 0, LedgerError::NothingUnlocked);
    if draining {
        let retired = window.iter().take_while(|s| s.is_exhausted()).count();
        track.advance_head(retired as u64)?;
    } else {
        track.advance_to(outcome.cursor)?;
    }
    Ok(ScanOutcome {
        cursor: track.cursor,
        ..outcome
    })
}

/// What `consume_vesting` would release over `window` at `now`.
pub fn preview_vesting<'a, I>(track: &Track, window: I, now: i64) -> Result<u64>
where
    I: IntoIterator<Item = &'a VestingSchedule>,
{
    if track.live() == 0 {
        return Ok(0);
    }
    let window: Vec<&'a VestingSchedule> = window.into_iter().collect();
    if !drains_head(track, window.first().copied(), now)? {
        check_rotation(window.iter().copied(), now)?;
    }
    preview_scan(window, now)
}

/// Take `amount` of principal out of shares into a new cooldown request.
///
/// `Stake` burns free shares; every other source retires locked shares that a
/// consume call has just released.
#[allow(clippy::too_many_arguments)]
pub fn enqueue_cooldown(
    ledger: &mut LedgerState,
    position: &mut Position,
    entry: &mut CooldownRequest,
    position_key: Pubkey,
    source: CooldownSource,
    index: u32,
    amount: u64,
    now: i64,
) -> Result<()> {
    require!(amount > 0, LedgerError::ZeroAmount);
    match source {
        CooldownSource::Stake => ledger.burn_free(position, amount)?,
        _ => ledger.decrease_locked(position, amount)?,
    }
    position.cooldown_track_mut(source).push(index)?;
    ledger.queue_principal(amount)?;

    entry.position = position_key;
    entry.source = source as u8;
    entry.index = index;
    entry.amount = amount;
    entry.maturity_time = ledger.cooldown_maturity(now)?;
    Ok(())
}

/// FIFO-consume matured requests of `source`; the caller pays out `released`.
pub fn withdraw_matured<'a, I>(
    ledger: &mut LedgerState,
    position: &mut Position,
    source: CooldownSource,
    window: I,
    now: i64,
) -> Result<ScanOutcome>
where
    I: IntoIterator<Item = &'a mut CooldownRequest>,
{
    let track = position.cooldown_track_mut(source);
    let outcome = bounded_scan(window, track.cursor, now)?;
    require!(outcome.released > 0, LedgerError::NothingToWithdraw);
    track.advance_to(outcome.cursor)?;
    ledger.release_queued(outcome.released)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LedgerParams, RotationWindow};
    use crate::testing::assert_ledger_err;

    const CLIFF: i64 = 1_000;
    const DURATION: i64 = 400;

    fn ledger() -> LedgerState {
        let mut params = LedgerParams::default();
        params.vesting_cliffs = [CLIFF, 2 * CLIFF];
        params.vesting_durations = [DURATION, 2 * DURATION];
        params.lock_durations = [100, 300];
        params.cooldown_delay = 50;
        LedgerState {
            params,
            ..Default::default()
        }
    }

    fn requests(ledger: &mut LedgerState, position: &mut Position, at: &[(u64, i64)]) -> Vec<CooldownRequest> {
        let key = Pubkey::new_unique();
        let total: u64 = at.iter().map(|(amount, _)| amount).sum();
        ledger.mint_free(position, total).unwrap();
        at.iter()
            .enumerate()
            .map(|(i, &(amount, now))| {
                let mut entry = CooldownRequest::default();
                enqueue_cooldown(
                    ledger,
                    position,
                    &mut entry,
                    key,
                    CooldownSource::Stake,
                    i as u32,
                    amount,
                    now,
                )
                .unwrap();
                entry
            })
            .collect()
    }

    /// One migration schedule of `amount` per credit time, indexed in order.
    fn credit_schedules(l: &mut LedgerState, p: &mut Position, amount: u64, at: &[i64]) -> Vec<VestingSchedule> {
        let key = Pubkey::new_unique();
        at.iter()
            .enumerate()
            .map(|(i, &now)| {
                let mut s = VestingSchedule::default();
                credit_vesting(l, p, &mut s, key, VestingPool::Migration, i as u32, amount, now).unwrap();
                s
            })
            .collect()
    }

    /// Schedules in the order a window of `max` visits them at `now`.
    fn window_of<'a>(
        p: &Position,
        schedules: &'a mut [VestingSchedule],
        max: u32,
        now: i64,
    ) -> Vec<&'a mut VestingSchedule> {
        let track = *p.vesting_track(VestingPool::Migration);
        let head_vested = schedules
            .get(track.head as usize)
            .map(|s| s.is_fully_vested(now).unwrap())
            .unwrap_or(false);
        let plan: RotationWindow = track.rotation_window(max, 8, head_vested);
        let mut slots: Vec<Option<&'a mut VestingSchedule>> = schedules.iter_mut().map(Some).collect();
        (0..plan.size)
            .map(|offset| slots[plan.index(offset) as usize].take().unwrap())
            .collect()
    }

    #[test]
    fn vesting_releases_linearly_then_reports_nothing_unlocked() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut schedule = VestingSchedule::default();
        credit_vesting(&mut l, &mut p, &mut schedule, Pubkey::new_unique(), VestingPool::Migration, 0, 40, 0).unwrap();
        assert_eq!(schedule.start_time, CLIFF);
        assert_eq!(p.locked_shares, 40);

        let out = consume_vesting(&mut p, VestingPool::Migration, [&mut schedule], CLIFF + DURATION / 4).unwrap();
        assert_eq!(out.released, 10);
        assert_eq!(schedule.claimed, 10);

        consume_vesting(&mut p, VestingPool::Migration, [&mut schedule], CLIFF + DURATION / 2).unwrap();
        assert_eq!(schedule.claimed, 20);

        consume_vesting(&mut p, VestingPool::Migration, [&mut schedule], CLIFF + DURATION).unwrap();
        assert_eq!(schedule.claimed, 40);
        let track = p.vesting_track(VestingPool::Migration);
        assert_eq!((track.cursor, track.head), (2, 1));

        assert_ledger_err(
            consume_vesting(&mut p, VestingPool::Migration, [&mut schedule], CLIFF + 10 * DURATION),
            LedgerError::NothingUnlocked,
        );
        assert_eq!(schedule.claimed, 40);
        assert_eq!(p.vesting_track(VestingPool::Migration).cursor, 2);
    }

    #[test]
    fn vesting_before_cliff_unlocks_nothing() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut s = VestingSchedule::default();
        credit_vesting(&mut l, &mut p, &mut s, Pubkey::new_unique(), VestingPool::Contributor, 0, 80, 5).unwrap();
        assert_eq!(s.start_time, 5 + 2 * CLIFF);
        assert_eq!(s.duration, 2 * DURATION);
        assert_ledger_err(
            consume_vesting(&mut p, VestingPool::Contributor, [&mut s], 5 + 2 * CLIFF),
            LedgerError::NothingUnlocked,
        );
    }

    #[test]
    fn vesting_rotation_covers_every_schedule_over_calls() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut schedules = credit_schedules(&mut l, &mut p, 10, &[0, 0, 0]);
        let now = CLIFF + DURATION / 2;

        let window = window_of(&p, &mut schedules, 2, now);
        assert_eq!(window.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1]);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 10);

        let window = window_of(&p, &mut schedules, 2, now);
        assert_eq!(window.iter().map(|s| s.index).collect::<Vec<_>>(), vec![2, 0]);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 5);
        assert_eq!(out.cursor, 4);
        assert!(schedules.iter().all(|s| s.claimed == 5));
        assert_eq!(p.vesting_track(VestingPool::Migration).head, 0);
    }

    #[test]
    fn vested_schedules_drain_from_head_in_order() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut schedules = credit_schedules(&mut l, &mut p, 10, &[0, 0, 0]);
        let now = CLIFF + DURATION;

        let window = window_of(&p, &mut schedules, 2, now);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 20);
        let track = *p.vesting_track(VestingPool::Migration);
        assert_eq!((track.head, track.cursor), (2, 0));

        let window = window_of(&p, &mut schedules, 2, now);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 10);
        assert_eq!(p.vesting_track(VestingPool::Migration).head, 3);
        assert!(schedules.iter().all(|s| s.is_exhausted()));
        let window = window_of(&p, &mut schedules, 2, now);
        assert!(window.is_empty());
        assert_ledger_err(
            consume_vesting(&mut p, VestingPool::Migration, window, now),
            LedgerError::NothingUnlocked,
        );
    }

    #[test]
    fn exhausted_run_never_blocks_later_schedules() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut at = vec![0i64; 16];
        at.extend([CLIFF; 4]);
        let mut schedules = credit_schedules(&mut l, &mut p, 10, &at);
        let late_start = 2 * CLIFF;

        let now = CLIFF + DURATION + 100;
        let mut released = Vec::new();
        for _ in 0..2 {
            let window = window_of(&p, &mut schedules, 0, now);
            released.push(consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap().released);
        }
        assert_eq!(released, vec![80, 80]);
        assert_eq!(p.vesting_track(VestingPool::Migration).head, 16);
        let window = window_of(&p, &mut schedules, 0, now);
        assert_ledger_err(
            consume_vesting(&mut p, VestingPool::Migration, window, now),
            LedgerError::NothingUnlocked,
        );

        // the four late schedules rotate among themselves, then drain
        let now = late_start + DURATION / 5;
        let window = window_of(&p, &mut schedules, 0, now);
        assert_eq!(window.iter().map(|s| s.index).collect::<Vec<_>>(), vec![16, 17, 18, 19]);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 8);
        released.push(out.released);

        let now = 1_000_000;
        let track = *p.vesting_track(VestingPool::Migration);
        let window = window_of(&p, &mut schedules, 0, now);
        assert_eq!(preview_vesting(&track, window.iter().map(|s| &**s), now).unwrap(), 32);
        let out = consume_vesting(&mut p, VestingPool::Migration, window, now).unwrap();
        assert_eq!(out.released, 32);
        released.push(out.released);

        assert!(schedules.iter().all(|s| s.is_exhausted()));
        assert_eq!(p.vesting_track(VestingPool::Migration).live(), 0);
        assert_eq!(released.iter().sum::<u64>(), 200);
    }

    #[test]
    fn vested_schedule_cannot_be_released_out_of_turn() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut schedules = credit_schedules(&mut l, &mut p, 10, &[0, 0]);
        let now = CLIFF + DURATION;
        let (_, tail) = schedules.split_at_mut(1);
        assert_ledger_err(
            consume_vesting(&mut p, VestingPool::Migration, [&mut tail[0]], now),
            LedgerError::VestedScheduleOutOfTurn,
        );
        assert_ledger_err(
            preview_vesting(p.vesting_track(VestingPool::Migration), [&tail[0]], now),
            LedgerError::VestedScheduleOutOfTurn,
        );
        assert_eq!(tail[0].claimed, 0);
    }

    #[test]
    fn fixed_locks_consume_fifo_and_never_skip_unmatured() {
        let mut l = ledger();
        let mut p = Position::default();
        let key = Pubkey::new_unique();
        let mut locks: Vec<FixedLock> = [(5u64, 0i64), (7, 50), (11, 10)]
            .iter()
            .enumerate()
            .map(|(i, &(amount, now))| {
                let mut lock = FixedLock::default();
                credit_fixed_lock(&mut l, &mut p, &mut lock, key, LockClass::Standard, i as u32, amount, now).unwrap();
                lock
            })
            .collect();
        assert_eq!(locks[1].unlock_time, 150);
        assert_eq!(p.locked_shares, 23);

        // third lock matured at 110 but sits behind the second (150)
        let out = consume_fixed_locks(&mut p, LockClass::Standard, locks.iter_mut(), 120).unwrap();
        assert_eq!(out.released, 5);
        assert_eq!(p.fixed_track(LockClass::Standard).cursor, 1);

        assert_ledger_err(
            consume_fixed_locks(&mut p, LockClass::Standard, locks[1..].iter_mut(), 149),
            LedgerError::NothingUnlocked,
        );
        let out = consume_fixed_locks(&mut p, LockClass::Standard, locks[1..].iter_mut(), 150).unwrap();
        assert_eq!(out.released, 18);
        assert_eq!(p.fixed_track(LockClass::Standard).cursor, 3);
        assert_ledger_err(
            consume_fixed_locks(&mut p, LockClass::Standard, locks[3..].iter_mut(), 10_000),
            LedgerError::NothingUnlocked,
        );
    }

    #[test]
    fn lock_classes_use_their_own_duration_and_cursor() {
        let mut l = ledger();
        let mut p = Position::default();
        let key = Pubkey::new_unique();
        let mut ext = FixedLock::default();
        credit_fixed_lock(&mut l, &mut p, &mut ext, key, LockClass::Extended, 0, 9, 0).unwrap();
        assert_eq!(ext.unlock_time, 300);
        assert_eq!(p.fixed_track(LockClass::Extended).len, 1);
        assert_eq!(p.fixed_track(LockClass::Standard).len, 0);

        let mut wrong = FixedLock::default();
        assert_ledger_err(
            credit_fixed_lock(&mut l, &mut p, &mut wrong, key, LockClass::Extended, 5, 9, 0),
            LedgerError::EntryOutOfOrder,
        );
        assert_ledger_err(
            credit_fixed_lock(&mut l, &mut p, &mut wrong, key, LockClass::Extended, 1, 0, 0),
            LedgerError::ZeroAmount,
        );
    }

    #[test]
    fn withdraw_takes_matured_prefix_only() {
        let mut l = ledger();
        let mut p = Position::default();
        // t0 = 50, t1 = 60, t2 = 70
        let mut queue = requests(&mut l, &mut p, &[(3, 0), (4, 10), (5, 20)]);
        assert_eq!(l.total_queued, 12);
        assert_eq!(p.free_shares, 0);
        let t1 = queue[1].maturity_time;

        let out = withdraw_matured(&mut l, &mut p, CooldownSource::Stake, queue.iter_mut(), t1 + 1).unwrap();
        assert_eq!(out.released, 7);
        assert_eq!(p.cooldown_track(CooldownSource::Stake).cursor, 2);
        assert_eq!(l.total_queued, 5);

        assert_ledger_err(
            withdraw_matured(&mut l, &mut p, CooldownSource::Stake, queue[2..].iter_mut(), t1 + 1),
            LedgerError::NothingToWithdraw,
        );
        let out = withdraw_matured(&mut l, &mut p, CooldownSource::Stake, queue[2..].iter_mut(), 1_000).unwrap();
        assert_eq!(out.released, 5);
        assert_ledger_err(
            withdraw_matured(&mut l, &mut p, CooldownSource::Stake, queue[3..].iter_mut(), 1_000),
            LedgerError::NothingToWithdraw,
        );
        assert_eq!(l.total_queued, 0);
    }

    #[test]
    fn unlock_then_cooldown_then_withdraw() {
        let mut l = ledger();
        let mut p = Position::default();
        let key = Pubkey::new_unique();
        let mut lock = FixedLock::default();
        credit_fixed_lock(&mut l, &mut p, &mut lock, key, LockClass::Standard, 0, 30, 0).unwrap();

        let out = consume_fixed_locks(&mut p, LockClass::Standard, [&mut lock], 100).unwrap();
        let mut request = CooldownRequest::default();
        enqueue_cooldown(&mut l, &mut p, &mut request, key, CooldownSource::FixedLock, 0, out.released, 100).unwrap();
        assert_eq!(p.locked_shares, 0);
        assert_eq!(l.total_shares().unwrap(), 0);
        assert_eq!(l.total_queued, 30);
        assert_eq!(request.maturity_time, 150);
        assert_eq!(p.cooldown_track(CooldownSource::Stake).len, 0);

        assert_eq!(preview_scan([&request], 149).unwrap(), 0);
        let out = withdraw_matured(&mut l, &mut p, CooldownSource::FixedLock, [&mut request], 150).unwrap();
        assert_eq!(out.released, 30);
    }

    #[test]
    fn stake_cooldown_requires_free_shares() {
        let mut l = ledger();
        let mut p = Position::default();
        l.increase_locked(&mut p, 10).unwrap();
        let mut request = CooldownRequest::default();
        assert_ledger_err(
            enqueue_cooldown(&mut l, &mut p, &mut request, Pubkey::new_unique(), CooldownSource::Stake, 0, 5, 0),
            LedgerError::InsufficientFreeShares,
        );
        assert_eq!(p.cooldown_track(CooldownSource::Stake).len, 0);
        assert_eq!(l.total_queued, 0);
    }

    #[test]
    fn restake_keeps_pending_reward() {
        let mut l = ledger();
        let mut p = Position::default();
        let mut s = VestingSchedule::default();
        credit_vesting(&mut l, &mut p, &mut s, Pubkey::new_unique(), VestingPool::Migration, 0, 40, 0).unwrap();
        l.deposit_rewards(120).unwrap();

        let out = consume_vesting(&mut p, VestingPool::Migration, [&mut s], CLIFF + DURATION).unwrap();
        l.convert_locked_to_free(&mut p, out.released).unwrap();
        assert_eq!(p.free_shares, 40);
        assert_eq!(p.locked_shares, 0);
        assert_eq!(l.pending_of(&p).unwrap(), 120);
    }
}

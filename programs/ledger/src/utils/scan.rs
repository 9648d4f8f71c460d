//! Bounded scans over append-only entry arrays.
//!
//! Fixed locks and cooldown requests are consumed FIFO: their `releasable`
//! returns `None` until maturity, so the scan stops at the first entry that is
//! not yet mature and the cursor only ever passes consumed entries. Vesting
//! schedules always report `Some` (possibly zero), so a scan over them visits
//! the whole window; which window, and what happens to the cursor, is decided
//! by the vesting registry.

use anchor_lang::prelude::*;

use crate::error::LedgerError;

/// An entry that releases principal over time.
pub trait Releasable {
    /// Amount releasable at `now`, or `None` when a scan must stop at this entry.
    fn releasable(&self, now: i64) -> Result<Option<u64>>;

    /// Record that `amount` was released. Cursor-consumed entries need no bookkeeping.
    fn mark_released(&mut self, _amount: u64) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Sum released by the scan.
    pub released: u64,
    /// Entries the cursor moved past.
    pub advanced: u64,
    /// Cursor after the scan.
    pub cursor: u64,
}

/// Walk `window` (already trimmed to the caller's bound, entry `i` sitting at
/// logical position `cursor + i`) and release what is due at `now`.
pub fn bounded_scan<'a, E, I>(window: I, cursor: u64, now: i64) -> Result<ScanOutcome>
where
    E: Releasable + 'a,
    I: IntoIterator<Item = &'a mut E>,
{
    let mut released: u64 = 0;
    let mut advanced: u64 = 0;

    for entry in window {
        let Some(amount) = entry.releasable(now)? else {
            break;
        };
        if amount > 0 {
            entry.mark_released(amount)?;
            released = released
                .checked_add(amount)
                .ok_or(LedgerError::MathOverflow)?;
        }
        advanced = advanced.checked_add(1).ok_or(LedgerError::MathOverflow)?;
    }

    Ok(ScanOutcome {
        released,
        advanced,
        cursor: cursor.checked_add(advanced).ok_or(LedgerError::MathOverflow)?,
    })
}

/// Read-only counterpart of `bounded_scan`, used by previews.
pub fn preview_scan<'a, E, I>(window: I, now: i64) -> Result<u64>
where
    E: Releasable + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut total: u64 = 0;
    for entry in window {
        let Some(amount) = entry.releasable(now)? else {
            break;
        };
        total = total.checked_add(amount).ok_or(LedgerError::MathOverflow)?;
    }
    Ok(total)
}

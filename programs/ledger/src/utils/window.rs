//! Loads a scan window of entry accounts from `remaining_accounts`.
//!
//! Entries are supplied in index order starting at the track cursor (FIFO), or
//! in the order of the vesting window (from the head, or from the rotation
//! position). Each one is checked against the position, kind and index it is
//! expected to hold before it is scanned.

use anchor_lang::prelude::*;

use crate::error::LedgerError;
use crate::registry;
use crate::state::{QueueEntry, Track, VestingSchedule};

pub fn load_entry<'info, T>(
    info: &'info AccountInfo<'info>,
    position: &Pubkey,
    kind: u8,
    index: u32,
    writable: bool,
) -> Result<Account<'info, T>>
where
    T: AccountSerialize + AccountDeserialize + Owner + Clone + QueueEntry,
{
    if writable {
        require!(info.is_writable, LedgerError::AccountNotWritable);
    }
    let entry: Account<'info, T> = Account::try_from(info)?;
    require_keys_eq!(entry.position(), *position, LedgerError::EntryMismatch);
    require!(entry.kind() == kind, LedgerError::EntryMismatch);
    require!(entry.index() == index, LedgerError::EntryOutOfOrder);
    Ok(entry)
}

/// Entries from the cursor forward, at most `max` (0 = all outstanding) and at
/// most as many as were supplied.
pub fn fifo_window<'info, T>(
    infos: &'info [AccountInfo<'info>],
    track: &Track,
    max: u32,
    position: &Pubkey,
    kind: u8,
) -> Result<Vec<Account<'info, T>>>
where
    T: AccountSerialize + AccountDeserialize + Owner + Clone + QueueEntry,
{
    let size = track.fifo_window(max).min(infos.len() as u64) as usize;
    let mut entries = Vec::with_capacity(size);
    for (offset, info) in infos.iter().take(size).enumerate() {
        let index = u32::try_from(track.cursor + offset as u64)
            .map_err(|_| LedgerError::ValueOutOfRange)?;
        entries.push(load_entry(info, position, kind, index, false)?);
    }
    Ok(entries)
}

/// The vesting window `Track::rotation_window` lays out. Whether it drains from
/// the head is read off the first supplied account: it must be the head
/// schedule, fully vested at `now`.
///
/// `writable` loads (unlock, restake) require the full window; previews take
/// as many entries as were supplied.
#[allow(clippy::too_many_arguments)]
pub fn vesting_window<'info>(
    infos: &'info [AccountInfo<'info>],
    track: &Track,
    max: u32,
    default_window: u16,
    position: &Pubkey,
    pool: u8,
    now: i64,
    writable: bool,
) -> Result<Vec<Account<'info, VestingSchedule>>> {
    let head_vested = match infos.first() {
        Some(info) if track.live() > 0 => {
            let first: Account<'info, VestingSchedule> = Account::try_from(info)?;
            registry::drains_head(track, Some(&*first), now)?
        }
        _ => false,
    };
    let plan = track.rotation_window(max, default_window, head_vested);
    let size = if writable {
        require!(infos.len() as u64 >= plan.size, LedgerError::EntryWindowShort);
        plan.size as usize
    } else {
        (plan.size as usize).min(infos.len())
    };

    let mut entries = Vec::with_capacity(size);
    for (offset, info) in infos.iter().take(size).enumerate() {
        entries.push(load_entry(info, position, pool, plan.index(offset as u64), writable)?);
    }
    Ok(entries)
}

//! Linear vesting with cliff.
//! - vested(t) = 0 for t < start
//! - vested(t) = total for t >= start + duration
//! - otherwise floor(total * (t - start) / duration)

use crate::error::LedgerError;

pub fn vested_amount(total: u64, start_ts: i64, duration: i64, now_ts: i64) -> Result<u64, LedgerError> {
    if now_ts < start_ts {
        return Ok(0);
    }
    let elapsed = now_ts
        .checked_sub(start_ts)
        .ok_or(LedgerError::MathOverflow)?;
    if duration <= 0 || elapsed >= duration {
        return Ok(total);
    }
    let v = (total as u128)
        .checked_mul(elapsed as u128)
        .ok_or(LedgerError::MathOverflow)?
        / duration as u128;
    u64::try_from(v).map_err(|_| LedgerError::MathOverflow)
}

/// First timestamp at which nothing remains unvested.
pub fn vesting_end(start_ts: i64, duration: i64) -> Result<i64, LedgerError> {
    start_ts
        .checked_add(duration)
        .ok_or(LedgerError::MathOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_before_start() {
        assert_eq!(vested_amount(40, 1_000, 400, 0).unwrap(), 0);
        assert_eq!(vested_amount(40, 1_000, 400, 999).unwrap(), 0);
        assert_eq!(vested_amount(40, 1_000, 400, 1_000).unwrap(), 0);
    }

    #[test]
    fn linear_between_start_and_end() {
        assert_eq!(vested_amount(40, 1_000, 400, 1_100).unwrap(), 10);
        assert_eq!(vested_amount(40, 1_000, 400, 1_200).unwrap(), 20);
        // floor(40 * 1 / 400) = 0
        assert_eq!(vested_amount(40, 1_000, 400, 1_001).unwrap(), 0);
        assert_eq!(vested_amount(40, 1_000, 400, 1_399).unwrap(), 39);
    }

    #[test]
    fn saturates_at_end() {
        assert_eq!(vested_amount(40, 1_000, 400, 1_400).unwrap(), 40);
        assert_eq!(vested_amount(40, 1_000, 400, i64::MAX).unwrap(), 40);
        assert_eq!(vesting_end(1_000, 400).unwrap(), 1_400);
    }

    #[test]
    fn large_totals_do_not_overflow() {
        let v = vested_amount(u64::MAX, 0, 4, 2).unwrap();
        assert_eq!(v, u64::MAX / 2);
    }
}

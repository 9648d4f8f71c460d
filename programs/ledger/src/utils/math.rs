//! Checked fixed-point helpers for the reward accumulator.
//!
//! `amount * ACC_PRECISION` does not fit in 128 bits for large `u64` amounts,
//! so products go through a 256-bit intermediate before the floor division.

use anchor_lang::prelude::*;

use crate::constants::ACC_PRECISION;
use crate::error::LedgerError;

const LO_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128`s as `(hi, lo)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LO_MASK);
    let (b1, b0) = (b >> 64, b & LO_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // Each term < 2^64, so the sum fits comfortably.
    let mid = (p00 >> 64) + (p01 & LO_MASK) + (p10 & LO_MASK);
    let lo = (p00 & LO_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor(a * b / d)`, failing if `d == 0` or the quotient exceeds `u128`.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Result<u128> {
    require!(d != 0, LedgerError::MathOverflow);
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Ok(lo / d);
    }
    require!(hi < d, LedgerError::MathOverflow);

    // Shift-subtract long division; `rem < d` holds at the top of every round.
    let mut rem = hi;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Ok(quotient)
}

/// Accumulator value of `shares` at `acc`: `floor(shares * acc / P)`.
pub fn accrued(shares: u64, acc_reward_per_share: u128) -> Result<i128> {
    let v = mul_div_floor(shares as u128, acc_reward_per_share, ACC_PRECISION)?;
    i128::try_from(v).map_err(|_| error!(LedgerError::ValueOutOfRange))
}

/// Accumulator increment for distributing `amount` over `total_shares`.
pub fn reward_per_share(amount: u64, total_shares: u64) -> Result<u128> {
    mul_div_floor(amount as u128, ACC_PRECISION, total_shares as u128)
}

/// Pro-rata slice `floor(total * part / whole)` narrowed back to `u64`.
pub fn pro_rata(total: u64, part: u64, whole: u64) -> Result<u64> {
    let v = mul_div_floor(total as u128, part as u128, whole as u128)?;
    u64::try_from(v).map_err(|_| error!(LedgerError::ValueOutOfRange))
}

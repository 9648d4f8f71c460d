//! Program-wide constants.

/// Fixed-point scale of `acc_reward_per_share`.
pub const ACC_PRECISION: u128 = 1_000_000_000_000_000_000_000_000;

/// Seconds per day (UTC).
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Default lock duration for the standard fixed-lock class.
pub const DEFAULT_STANDARD_LOCK_SECS: i64 = 90 * SECONDS_PER_DAY;

/// Default lock duration for the extended fixed-lock class.
pub const DEFAULT_EXTENDED_LOCK_SECS: i64 = 365 * SECONDS_PER_DAY;

/// Default cliff and duration of migration-originated vesting.
pub const DEFAULT_MIGRATION_CLIFF_SECS: i64 = 90 * SECONDS_PER_DAY;
pub const DEFAULT_MIGRATION_VESTING_SECS: i64 = 365 * SECONDS_PER_DAY;

/// Default cliff and duration of contributor-originated vesting.
pub const DEFAULT_CONTRIBUTOR_CLIFF_SECS: i64 = 180 * SECONDS_PER_DAY;
pub const DEFAULT_CONTRIBUTOR_VESTING_SECS: i64 = 730 * SECONDS_PER_DAY;

/// Delay between a withdrawal request and the funds becoming claimable.
pub const DEFAULT_COOLDOWN_SECS: i64 = 7 * SECONDS_PER_DAY;

/// Vesting schedules visited per call when the caller passes `max_schedules = 0`.
pub const DEFAULT_VESTING_WINDOW: u16 = 8;

/// Max positions settled per `autocompound_batch` call.
pub const MAX_BATCH_COMPOUND: usize = 16;

pub const LEDGER_SEED: &[u8] = b"ledger";
pub const PRINCIPAL_VAULT_SEED: &[u8] = b"principal_vault";
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";
pub const POSITION_SEED: &[u8] = b"position";
pub const FIXED_LOCK_SEED: &[u8] = b"fixed_lock";
pub const VESTING_SEED: &[u8] = b"vesting";
pub const COOLDOWN_SEED: &[u8] = b"cooldown";
pub const ROLE_SEED: &[u8] = b"role";

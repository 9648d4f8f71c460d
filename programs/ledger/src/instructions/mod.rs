pub mod initialize_ledger;
pub mod set_authority;
pub mod set_swap_venue;
pub mod grant_role;
pub mod revoke_role;
pub mod open_position;
pub mod set_autocompound;
pub mod stake;
pub mod transfer_shares;
pub mod deposit_rewards;
pub mod claim_rewards;
pub mod credit_fixed_lock;
pub mod credit_vesting;
pub mod credit_contributor_vesting;
pub mod request_withdrawal;
pub mod unlock_fixed;
pub mod unlock_vesting;
pub mod restake_fixed;
pub mod restake_vesting;
pub mod withdraw;
pub mod autocompound;
pub mod autocompound_batch;
pub mod quote_unlockable;
pub mod quote_claimable;

pub use initialize_ledger::*;
pub use set_authority::*;
pub use set_swap_venue::*;
pub use grant_role::*;
pub use revoke_role::*;
pub use open_position::*;
pub use set_autocompound::*;
pub use stake::*;
pub use transfer_shares::*;
pub use deposit_rewards::*;
pub use claim_rewards::*;
pub use credit_fixed_lock::*;
pub use credit_vesting::*;
pub use credit_contributor_vesting::*;
pub use request_withdrawal::*;
pub use unlock_fixed::*;
pub use unlock_vesting::*;
pub use restake_fixed::*;
pub use restake_vesting::*;
pub use withdraw::*;
pub use autocompound::*;
pub use autocompound_batch::*;
pub use quote_unlockable::*;
pub use quote_claimable::*;

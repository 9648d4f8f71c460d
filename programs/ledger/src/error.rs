use anchor_lang::prelude::*;

/// Custom error codes for the staking ledger program.
#[error_code]
pub enum LedgerError {
    #[msg("Unauthorized: admin signature required")]
    UnauthorizedAdmin,

    #[msg("Unauthorized: migrator signature required")]
    UnauthorizedMigrator,

    #[msg("Unauthorized: funder signature required")]
    UnauthorizedFunder,

    #[msg("Unauthorized: position owner signature required")]
    UnauthorizedOwner,

    #[msg("Invalid public key")]
    InvalidPubkey,

    #[msg("Invalid configuration")]
    InvalidConfig,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Value exceeds its storage bound")]
    ValueOutOfRange,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Insufficient free shares")]
    InsufficientFreeShares,

    #[msg("Insufficient locked shares")]
    InsufficientLockedShares,

    #[msg("No shares outstanding to deposit rewards against")]
    NoShares,

    #[msg("Nothing unlocked")]
    NothingUnlocked,

    #[msg("Nothing to withdraw")]
    NothingToWithdraw,

    #[msg("No pending reward to compound")]
    NothingToCompound,

    #[msg("Swap returned less than the guaranteed minimum")]
    SlippageExceeded,

    #[msg("Reentrant call rejected")]
    ReentrantCall,

    #[msg("Entry belongs to another position or queue")]
    EntryMismatch,

    #[msg("Entry supplied out of order")]
    EntryOutOfOrder,

    #[msg("Fewer entries supplied than the scan window requires")]
    EntryWindowShort,

    #[msg("Fully vested schedules must be released from the head first")]
    VestedScheduleOutOfTurn,

    #[msg("Account is not writable")]
    AccountNotWritable,

    #[msg("Empty batch")]
    EmptyBatch,

    #[msg("Batch size too large")]
    BatchTooLarge,

    #[msg("Cannot transfer shares to the same position")]
    SelfTransfer,

    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Invalid token account")]
    InvalidTokenAccount,

    #[msg("Swap venue does not match configuration")]
    InvalidSwapVenue,
}

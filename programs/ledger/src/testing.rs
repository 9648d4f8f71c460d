//! Test helpers shared by the in-module unit tests.

use anchor_lang::error::{Error, ERROR_CODE_OFFSET};

use crate::error::LedgerError;

/// Assert that `res` failed with exactly `expected`.
pub fn assert_ledger_err<T: std::fmt::Debug>(res: anchor_lang::Result<T>, expected: LedgerError) {
    match res {
        Err(Error::AnchorError(e)) => assert_eq!(
            e.error_code_number,
            expected as u32 + ERROR_CODE_OFFSET,
            "expected {:?}, got {}",
            expected,
            e.error_msg
        ),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

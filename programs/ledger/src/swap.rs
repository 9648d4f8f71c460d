//! Swap venue seam.
//!
//! The venue is the only untrusted program the ledger hands control to. Its
//! reported output is advisory; callers measure the principal vault instead.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke};
use anchor_spl::token::{self, Approve, Revoke, TokenAccount};
use bytemuck::{Pod, Zeroable};

use crate::constants::LEDGER_SEED;
use crate::state::LedgerState;

/// Fixed header of the swap instruction payload; routing data follows it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SwapArgs {
    pub amount_in: u64,
    pub min_amount_out: u64,
}

pub fn encode_swap_data(amount_in: u64, min_amount_out: u64, routing: &[u8]) -> Vec<u8> {
    let args = SwapArgs {
        amount_in,
        min_amount_out,
    };
    let header = bytemuck::bytes_of(&args);
    let mut data = Vec::with_capacity(header.len() + routing.len());
    data.extend_from_slice(header);
    data.extend_from_slice(routing);
    data
}

/// Digest of routing data recorded in events in place of the raw bytes.
pub fn route_digest(routing: &[u8]) -> [u8; 32] {
    *blake3::hash(routing).as_bytes()
}

pub trait SwapVenue {
    /// Principal currently held by the ledger's own vault.
    fn principal_balance(&mut self) -> Result<u64>;

    /// Convert `amount_in` reward units into principal delivered to the ledger
    /// vault. `ledger` is the state to expose while control is away (guard set).
    /// The returned figure is whatever the venue claims and is never trusted.
    fn swap(
        &mut self,
        ledger: &LedgerState,
        amount_in: u64,
        min_amount_out: u64,
        routing: &[u8],
    ) -> Result<u64>;
}

/// Venue reached through CPI: approve exactly `amount_in` on the reward vault
/// to the configured swap authority, invoke the swap program, revoke.
pub struct CpiSwapVenue<'a, 'info> {
    pub ledger: AccountInfo<'info>,
    pub ledger_bump: u8,
    pub reward_vault: AccountInfo<'info>,
    pub principal_vault: &'a mut Account<'info, TokenAccount>,
    pub swap_program: AccountInfo<'info>,
    pub swap_authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub route_accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> CpiSwapVenue<'a, 'info> {
    /// Write `state` to the ledger account so a re-entrant call observes the guard.
    fn persist(&self, state: &LedgerState) -> Result<()> {
        let mut data = self.ledger.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data;
        state.try_serialize(&mut writer)?;
        Ok(())
    }

    fn reported_amount_out(&self) -> u64 {
        match get_return_data() {
            Some((program_id, data)) if program_id == *self.swap_program.key => data
                .get(..8)
                .and_then(|b| <[u8; 8]>::try_from(b).ok())
                .map(u64::from_le_bytes)
                .unwrap_or(0),
            _ => 0,
        }
    }
}

impl<'a, 'info> SwapVenue for CpiSwapVenue<'a, 'info> {
    fn principal_balance(&mut self) -> Result<u64> {
        self.principal_vault.reload()?;
        Ok(self.principal_vault.amount)
    }

    fn swap(
        &mut self,
        ledger: &LedgerState,
        amount_in: u64,
        min_amount_out: u64,
        routing: &[u8],
    ) -> Result<u64> {
        self.persist(ledger)?;

        let signer_seeds: &[&[&[u8]]] = &[&[LEDGER_SEED, &[self.ledger_bump]]];
        token::approve(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Approve {
                    to: self.reward_vault.clone(),
                    delegate: self.swap_authority.clone(),
                    authority: self.ledger.clone(),
                },
                signer_seeds,
            ),
            amount_in,
        )?;

        let principal_vault = self.principal_vault.to_account_info();
        let mut metas = vec![
            AccountMeta::new(*self.reward_vault.key, false),
            AccountMeta::new(*principal_vault.key, false),
            AccountMeta::new_readonly(*self.swap_authority.key, false),
            AccountMeta::new_readonly(*self.token_program.key, false),
        ];
        let mut infos = vec![
            self.reward_vault.clone(),
            principal_vault,
            self.swap_authority.clone(),
            self.token_program.clone(),
        ];
        // Route accounts keep their writability but never carry a signature.
        for acc in self.route_accounts {
            metas.push(if acc.is_writable {
                AccountMeta::new(*acc.key, false)
            } else {
                AccountMeta::new_readonly(*acc.key, false)
            });
            infos.push(acc.clone());
        }
        infos.push(self.swap_program.clone());

        let ix = Instruction {
            program_id: *self.swap_program.key,
            accounts: metas,
            data: encode_swap_data(amount_in, min_amount_out, routing),
        };
        invoke(&ix, &infos)?;
        let reported = self.reported_amount_out();

        token::revoke(CpiContext::new_with_signer(
            self.token_program.clone(),
            Revoke {
                source: self.reward_vault.clone(),
                authority: self.ledger.clone(),
            },
            signer_seeds,
        ))?;

        Ok(reported)
    }
}

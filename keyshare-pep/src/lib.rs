//! Deferred execution of pre-encrypted transactions.
//!
//! Clients schedule a transaction for a future height. At the start of that height the
//! scheduled transactions are executed in index order, after the key for the height has
//! been released and the payload decrypted.

mod auth;
mod error;
mod exec;
mod layout;
mod nonce;
mod router;
mod schedule;
mod tx;

pub use auth::{Account, AccountKeeper, DirectSignMode, SignModeHandler, SignerData};
pub use error::{DispatchError, ExecError, ScheduleError};
pub use exec::{BatchReport, Outcome};
pub use router::{ExecContext, MsgRouter, Router};
pub use tx::TxBuilder;

/// The execution engine.
///
/// Like the key share module it keeps no state of its own; schedules and nonces live in
/// the store passed to each operation.
#[derive(Debug, Clone)]
pub struct Pep<H = DirectSignMode> {
    chain_id: String,
    sign_mode: H,
}

impl Pep<DirectSignMode> {
    pub fn new<S: Into<String>>(chain_id: S) -> Self {
        Self::with_sign_mode(chain_id, DirectSignMode)
    }
}

impl<H: SignModeHandler> Pep<H> {
    pub fn with_sign_mode<S: Into<String>>(chain_id: S, sign_mode: H) -> Self {
        Self {
            chain_id: chain_id.into(),
            sign_mode,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn sign_mode(&self) -> &H {
        &self.sign_mode
    }
}

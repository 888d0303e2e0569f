//! Account lookup and sign bytes.

use std::collections::BTreeMap;

use committable::Committable;
use keyshare_types::{Address, PublicKey, SignDoc};

use crate::TxBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub number: u64,
    /// Unset until the account has signed something.
    pub public_key: Option<PublicKey>,
}

pub trait AccountKeeper {
    fn account(&self, address: &Address) -> Option<Account>;
}

impl AccountKeeper for BTreeMap<Address, Account> {
    fn account(&self, address: &Address) -> Option<Account> {
        self.get(address).cloned()
    }
}

impl<T: AccountKeeper + ?Sized> AccountKeeper for &T {
    fn account(&self, address: &Address) -> Option<Account> {
        (**self).account(address)
    }
}

/// What a signature is checked against, besides the transaction itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    pub address: Address,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub public_key: PublicKey,
}

/// Produces the bytes a signer signs.
pub trait SignModeHandler {
    fn sign_bytes(&self, signer: &SignerData, tx: &TxBuilder) -> Vec<u8>;
}

/// Signs the commitment of the [`SignDoc`] of body, auth info and signer data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSignMode;

impl SignModeHandler for DirectSignMode {
    fn sign_bytes(&self, signer: &SignerData, tx: &TxBuilder) -> Vec<u8> {
        let doc = SignDoc {
            body: tx.body().clone(),
            auth_info: tx.auth_info().clone(),
            chain_id: signer.chain_id.clone(),
            account_number: signer.account_number,
            sequence: signer.sequence,
        };
        AsRef::<[u8]>::as_ref(&doc.commit()).to_vec()
    }
}

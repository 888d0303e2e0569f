use keyshare_types::{
    Address, AuthInfo, Keypair, Msg, PublicKey, Signature, SignedTx, SignerInfo, TxBody,
};

use crate::{ExecError, SignModeHandler, SignerData};

/// An executable transaction, either decoded from a scheduled payload or under
/// construction by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxBuilder {
    body: TxBody,
    auth_info: AuthInfo,
    signatures: Vec<String>,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a scheduled payload.
    pub fn decode(data: &[u8]) -> Result<SignedTx, ExecError> {
        SignedTx::decode(data).map_err(|e| ExecError::Decode(e.to_string()))
    }

    /// Wrap a decoded transaction for execution.
    pub fn wrap(tx: SignedTx) -> Result<Self, ExecError> {
        if tx.body.messages.is_empty() {
            return Err(ExecError::Wrap("transaction has no messages"));
        }
        Ok(Self {
            body: tx.body,
            auth_info: tx.auth_info,
            signatures: tx.signatures,
        })
    }

    pub fn message(mut self, m: Msg) -> Self {
        self.body.messages.push(m);
        self
    }

    pub fn memo<S: Into<String>>(mut self, memo: S) -> Self {
        self.body.memo = memo.into();
        self
    }

    pub fn signer(mut self, public_key: PublicKey, sequence: u64) -> Self {
        self.auth_info.signer_infos.push(SignerInfo {
            public_key,
            sequence,
        });
        self
    }

    /// Sign for every signer info, in order, with the matching key.
    ///
    /// All signers must be added first since the sign bytes cover the auth info.
    pub fn sign<H: SignModeHandler>(
        mut self,
        handler: &H,
        keys: &[&Keypair],
        chain_id: &str,
        account_number: u64,
    ) -> Self {
        let mut sigs = Vec::with_capacity(keys.len());
        for (info, k) in self.auth_info.signer_infos.iter().zip(keys) {
            let data = SignerData {
                address: Address::from(&info.public_key),
                chain_id: chain_id.to_string(),
                account_number,
                sequence: info.sequence,
                public_key: info.public_key,
            };
            sigs.push(k.sign(&handler.sign_bytes(&data, &self)).to_bs58())
        }
        self.signatures = sigs;
        self
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn messages(&self) -> &[Msg] {
        &self.body.messages
    }

    /// Pair every signer info with its parsed signature.
    pub fn signatures(&self) -> Result<Vec<(SignerInfo, Signature)>, ExecError> {
        let infos = &self.auth_info.signer_infos;
        if infos.len() != self.signatures.len() {
            return Err(ExecError::Signatures(format!(
                "{} signatures for {} signers",
                self.signatures.len(),
                infos.len()
            )));
        }
        infos
            .iter()
            .zip(&self.signatures)
            .map(|(i, s)| {
                let sig = Signature::from_bs58(s).map_err(|e| ExecError::Signatures(e.to_string()))?;
                Ok((i.clone(), sig))
            })
            .collect()
    }

    pub fn build(self) -> SignedTx {
        SignedTx {
            body: self.body,
            auth_info: self.auth_info,
            signatures: self.signatures,
        }
    }
}

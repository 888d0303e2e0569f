use committable::{Commitment, Committable, RawCommitmentBuilder};
use serde::{Deserialize, Serialize};

use crate::{Height, PublicKey};

/// One message of a transaction, routed to a handler by its type URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub type_url: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Msg {
    pub fn new<S: Into<String>>(type_url: S, value: serde_json::Value) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub public_key: PublicKey,
    pub sequence: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
}

/// A signed transaction in its JSON wire form.
///
/// Signatures are kept as base58 text and only parsed when the transaction is executed,
/// so a malformed signature surfaces as an execution failure rather than a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl SignedTx {
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// The data a signer commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDoc {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// A pre-encrypted transaction waiting for its target height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEncryptedTx {
    pub target_height: Height,
    pub index: u64,
    /// Base58 address of the submitter, resolved at execution time.
    pub creator: String,
    pub data: Vec<u8>,
}

impl Committable for Msg {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Msg")
            .var_size_field("type_url", self.type_url.as_bytes())
            .var_size_field("value", self.value.to_string().as_bytes())
            .finalize()
    }
}

impl Committable for TxBody {
    fn commit(&self) -> Commitment<Self> {
        let msgs: Vec<_> = self.messages.iter().map(Committable::commit).collect();
        RawCommitmentBuilder::new("TxBody")
            .array_field("messages", &msgs)
            .var_size_field("memo", self.memo.as_bytes())
            .finalize()
    }
}

impl Committable for SignerInfo {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("SignerInfo")
            .field("public_key", self.public_key.commit())
            .u64_field("sequence", self.sequence)
            .finalize()
    }
}

impl Committable for AuthInfo {
    fn commit(&self) -> Commitment<Self> {
        let infos: Vec<_> = self.signer_infos.iter().map(Committable::commit).collect();
        RawCommitmentBuilder::new("AuthInfo")
            .array_field("signer_infos", &infos)
            .finalize()
    }
}

impl Committable for SignDoc {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("SignDoc")
            .field("body", self.body.commit())
            .field("auth_info", self.auth_info.commit())
            .var_size_field("chain_id", self.chain_id.as_bytes())
            .u64_field("account_number", self.account_number)
            .u64_field("sequence", self.sequence)
            .finalize()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Keypair;

    fn tx() -> SignedTx {
        let k = Keypair::from_seed([9; 32]);
        SignedTx {
            body: TxBody {
                messages: vec![Msg::new("/bank.MsgSend", json!({"amount": 5}))],
                memo: String::new(),
            },
            auth_info: AuthInfo {
                signer_infos: vec![SignerInfo {
                    public_key: k.public_key(),
                    sequence: 0,
                }],
            },
            signatures: vec![],
        }
    }

    #[test]
    fn json_wire_form() {
        let t = tx();
        let bytes = t.encode().unwrap();
        assert_eq!(SignedTx::decode(&bytes).unwrap(), t);
        assert!(SignedTx::decode(b"{\"body\":1}").is_err());
    }

    #[test]
    fn sign_doc_binds_sequence_and_chain() {
        let t = tx();
        let doc = |chain: &str, seq| SignDoc {
            body: t.body.clone(),
            auth_info: t.auth_info.clone(),
            chain_id: chain.into(),
            account_number: 1,
            sequence: seq,
        };
        assert_eq!(doc("a", 0).commit(), doc("a", 0).commit());
        assert_ne!(doc("a", 0).commit(), doc("a", 1).commit());
        assert_ne!(doc("a", 0).commit(), doc("b", 0).commit());
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const SUFFIX: &str = "/rq";

/// Label binding future ciphertexts to one aggregation event.
///
/// Identities are derived from a persisted request counter, so their order is the order in
/// which requests were accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identity(u64);

impl Identity {
    pub fn from_count(count: u64) -> Self {
        Self(count)
    }

    pub fn count(self) -> u64 {
        self.0
    }

    /// Context bytes a general key share for this identity is bound to.
    pub fn context(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SUFFIX}", self.0)
    }
}

impl FromStr for Identity {
    type Err = InvalidIdentity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s.strip_suffix(SUFFIX).ok_or(InvalidIdentity(()))?;
        n.parse().map(Self).map_err(|_| InvalidIdentity(()))
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for Identity {
    type Error = InvalidIdentity;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid identity")]
pub struct InvalidIdentity(());

/// Id a requester uses to correlate its own request with the identity it was given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProposalId> for RequestId {
    fn from(p: ProposalId) -> Self {
        Self(p.0.to_string())
    }
}

/// Governance proposal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl From<u64> for ProposalId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<ProposalId> for u64 {
    fn from(p: ProposalId) -> Self {
        p.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

use std::fmt;
use std::ops::{Add, Deref, Sub};

use committable::{Commitment, Committable, RawCommitmentBuilder};
use serde::{Deserialize, Serialize};

/// Block height.
#[derive(
    Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    pub const fn new(h: u64) -> Self {
        Self(h)
    }

    pub fn genesis() -> Self {
        Self(0)
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Context bytes a key share for this height is bound to.
    pub fn context(self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }
}

impl Add<u64> for Height {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub<u64> for Height {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_sub(rhs))
    }
}

impl From<u64> for Height {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Height> for u64 {
    fn from(value: Height) -> Self {
        value.0
    }
}

impl Deref for Height {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Committable for Height {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Height")
            .u64_field("height", self.0)
            .finalize()
    }
}

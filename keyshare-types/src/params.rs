use serde::{Deserialize, Serialize};

use crate::Address;

/// Module parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Valid shares needed to combine a key. Also the number of commitment coefficients.
    pub threshold: u32,

    /// Number of blocks a public key stays active after activation.
    pub key_expiry: u64,

    /// Addresses allowed to queue public keys.
    pub trusted_addresses: Vec<Address>,

    /// Validators that must be registered before a public key may be queued.
    pub min_validators: u32,

    /// Number of past heights whose aggregated keys are kept (0 keeps all).
    pub aggregated_retention: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            threshold: 1,
            key_expiry: 100,
            trusted_addresses: Vec::new(),
            min_validators: 1,
            aggregated_retention: 0,
        }
    }
}

impl Params {
    pub fn is_trusted(&self, a: &Address) -> bool {
        self.trusted_addresses.contains(a)
    }

    pub fn validate(&self) -> Result<(), InvalidParams> {
        if self.threshold == 0 {
            return Err(InvalidParams::ZeroThreshold);
        }
        if self.min_validators < self.threshold {
            return Err(InvalidParams::TooFewValidators {
                min: self.min_validators,
                threshold: self.threshold,
            });
        }
        if self.key_expiry == 0 {
            return Err(InvalidParams::ZeroExpiry);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidParams {
    #[error("threshold must be positive")]
    ZeroThreshold,

    #[error("min validators {min} below threshold {threshold}")]
    TooFewValidators { min: u32, threshold: u32 },

    #[error("key expiry must be positive")]
    ZeroExpiry,
}

//! Ownership check gating registry mutations.

use modular_core::{Address, InstanceState, ModularError, ModularResult};

/// Authorizes mutations of an instance's selector map.
///
/// Reads are never gated; only batch application calls this.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Fail with [`ModularError::Unauthorized`] unless `caller` owns `state`.
    pub fn require_owner(state: &InstanceState, caller: Address) -> ModularResult<()> {
        if caller == state.owner() {
            Ok(())
        } else {
            tracing::warn!(%caller, owner = %state.owner(), "rejected non-owner mutation");
            Err(ModularError::Unauthorized { caller })
        }
    }
}

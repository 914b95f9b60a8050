//! Call routing for instances.
//!
//! An instance implements no operations of its own. Every invocation goes
//! through [`DispatchProxy`], which resolves the selector in the instance's
//! current selector map and forwards the call to the module found there.

use modular_core::{CallContext, Felt, ModularError, ModularResult, Selector};

/// The code every instance runs.
///
/// Resolution is repeated on every call; nothing is cached, so a batch that
/// changes the map is visible to the very next invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchProxy;

impl DispatchProxy {
    /// Route `selector` to its module, preserving the caller.
    ///
    /// Fails with [`ModularError::NoSuchOperation`] when the selector is not
    /// mapped. A module failure is returned unchanged.
    pub fn dispatch(
        ctx: &mut CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>> {
        let Some(module) = ctx.selectors().get(&selector) else {
            tracing::debug!(%selector, "dispatch miss");
            return Err(ModularError::NoSuchOperation(selector));
        };
        tracing::debug!(%selector, %module, "dispatch hit");
        ctx.library_call(module, selector, calldata)
    }
}

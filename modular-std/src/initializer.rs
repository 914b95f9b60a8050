//! One-shot setup call made at the end of a batch.

use modular_core::{Address, CallContext, Felt, ModularError, ModularResult, Selector};

/// Invokes a module's `initializer` entry point on behalf of a batch.
///
/// The call is a library call: it runs against the batching instance's
/// state under the batch submitter's identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitializerInvoker;

impl InitializerInvoker {
    /// Call `target`'s initializer with `args`.
    ///
    /// Every failure, including a missing module, is reported as
    /// [`ModularError::InitializerFailed`].
    pub fn invoke(ctx: &mut CallContext<'_>, target: Address, args: &[Felt]) -> ModularResult<()> {
        tracing::debug!(%target, args = args.len(), "calling initializer");
        ctx.library_call(target, Selector::initializer(), args)
            .map(|_| ())
            .map_err(|source| ModularError::InitializerFailed(Box::new(source)))
    }
}

//! Testing utilities for modular contracts.
//!
//! Ready-made modules for exercising registries, dispatch and rollback.
//!
//! # Features
//!
//! - [`UnderOver`]: the reference module, keeping one number in storage
//! - [`FailingInitializer`]: writes state in its initializer, then reverts
//! - [`CallerProbe`]: reports the caller and contract it observes
//! - [`Reverter`]: fails every call with a module-defined error

use modular_core::{
    CallContext, CalldataReader, Event, Felt, ModularError, ModularResult, storage_var,
};
use modular_macros::module;

// ============================================================================
// UnderOver
// ============================================================================

/// Storage variable holding the reference number of [`UnderOver`].
pub const REFERENCE: &str = "reference";

/// Reference module keeping a single number per instance.
///
/// - `setReference(v)` stores `v`
/// - `getReference()` returns `[v]`, zero until set
/// - `underOver(x)` returns `[x < v, x > v]`
/// - `initializer(v)` stores `v` during a batch
#[derive(Debug, Clone, Copy, Default)]
pub struct UnderOver;

#[module(crate = "::modular_core", name = "UnderOver")]
impl UnderOver {
    #[operation(name = "setReference")]
    fn set_reference(&self, ctx: &mut CallContext<'_>, calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        let value = single_arg(calldata)?;
        ctx.storage_write(storage_var(REFERENCE), value);
        Ok(Vec::new())
    }

    #[operation(name = "getReference")]
    fn get_reference(&self, ctx: &mut CallContext<'_>, calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        CalldataReader::new(calldata).finish()?;
        Ok(vec![ctx.storage_read(storage_var(REFERENCE))])
    }

    #[operation(name = "underOver")]
    fn under_over(&self, ctx: &mut CallContext<'_>, calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        let value = single_arg(calldata)?;
        let reference = ctx.storage_read(storage_var(REFERENCE));
        Ok(vec![Felt::from(value < reference), Felt::from(value > reference)])
    }

    #[operation]
    fn initializer(&self, ctx: &mut CallContext<'_>, calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        let value = single_arg(calldata)?;
        ctx.storage_write(storage_var(REFERENCE), value);
        Ok(Vec::new())
    }
}

fn single_arg(calldata: &[Felt]) -> ModularResult<Felt> {
    let mut reader = CalldataReader::new(calldata);
    let value = reader.felt()?;
    reader.finish()?;
    Ok(value)
}

// ============================================================================
// FailingInitializer
// ============================================================================

/// Storage variable written by [`FailingInitializer`] before it reverts.
pub const POISONED: &str = "poisoned";

/// A module whose initializer mutates state and then fails.
///
/// Useful for asserting that a failed batch leaves no trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingInitializer;

#[module(
    crate = "::modular_core",
    name = "FailingInitializer",
    events = ["Poisoned"]
)]
impl FailingInitializer {
    #[operation]
    fn poke(&self, _ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        Ok(vec![Felt::ONE])
    }

    #[operation]
    fn initializer(&self, ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        ctx.storage_write(storage_var(POISONED), Felt::ONE);
        ctx.emit(Event::named("Poisoned", Vec::new()));
        Err(ModularError::custom("initializer rejected"))
    }
}

// ============================================================================
// CallerProbe
// ============================================================================

/// Storage variable recording the last caller seen by [`CallerProbe`].
pub const LAST_CALLER: &str = "lastCaller";

/// Reports the identities a module observes when called.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerProbe;

#[module(crate = "::modular_core", name = "CallerProbe")]
impl CallerProbe {
    /// Returns `[caller, contract, depth]` and records the caller.
    #[operation(name = "whoCalled")]
    fn who_called(&self, ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        ctx.storage_write(storage_var(LAST_CALLER), ctx.caller().felt());
        Ok(vec![
            ctx.caller().felt(),
            ctx.contract_address().felt(),
            Felt::from(ctx.depth()),
        ])
    }

    #[operation]
    fn initializer(&self, ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        ctx.storage_write(storage_var(LAST_CALLER), ctx.caller().felt());
        Ok(Vec::new())
    }
}

// ============================================================================
// Reverter
// ============================================================================

/// Message carried by every [`Reverter`] failure.
pub const REVERT_REASON: &str = "reverted by module";

/// A module that writes state and then fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverter;

#[module(crate = "::modular_core", name = "Reverter")]
impl Reverter {
    #[operation(name = "alwaysRevert")]
    fn always_revert(&self, ctx: &mut CallContext<'_>, _calldata: &[Felt]) -> ModularResult<Vec<Felt>> {
        ctx.storage_write(storage_var(POISONED), Felt::ONE);
        Err(ModularError::custom(REVERT_REASON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modular_core::{Address, InstanceState, Module, Selector};
    use std::{collections::HashMap, sync::Arc};

    type Resolver = HashMap<Address, Arc<dyn Module>>;

    fn run(module: &dyn Module, name: &str, calldata: &[Felt]) -> (ModularResult<Vec<Felt>>, InstanceState) {
        let resolver = Resolver::new();
        let mut state = InstanceState::new(Address::from(1u64));
        let out = {
            let mut ctx = CallContext::new(&mut state, &resolver, Address::from(50u64), Address::from(1u64), 8);
            module.invoke(&mut ctx, Selector::from_name(name), calldata)
        };
        (out, state)
    }

    #[test]
    fn test_under_over_descriptor() {
        let descriptor = UnderOver.descriptor();
        assert_eq!(descriptor.name, "UnderOver");
        assert_eq!(
            descriptor.functions,
            vec!["setReference", "getReference", "underOver", "initializer"]
        );
        assert!(descriptor.has_initializer());
    }

    #[test]
    fn test_under_over_compares_against_reference() {
        let resolver = Resolver::new();
        let mut state = InstanceState::new(Address::from(1u64));
        let mut ctx = CallContext::new(&mut state, &resolver, Address::from(50u64), Address::from(1u64), 8);

        UnderOver
            .invoke(&mut ctx, Selector::from_name("setReference"), &[Felt::from(10u64)])
            .unwrap();
        fn check(ctx: &mut CallContext<'_>, x: u64) -> Vec<Felt> {
            UnderOver
                .invoke(ctx, Selector::from_name("underOver"), &[Felt::from(x)])
                .unwrap()
        }
        assert_eq!(check(&mut ctx, 3), vec![Felt::ONE, Felt::ZERO]);
        assert_eq!(check(&mut ctx, 10), vec![Felt::ZERO, Felt::ZERO]);
        assert_eq!(check(&mut ctx, 11), vec![Felt::ZERO, Felt::ONE]);
    }

    #[test]
    fn test_unknown_entry_point() {
        let (out, _) = run(&UnderOver, "missing", &[]);
        assert!(matches!(
            out,
            Err(ModularError::EntryPointNotFound { module, .. }) if module == Address::from(50u64)
        ));
    }

    #[test]
    fn test_wrong_arity_is_a_calldata_error() {
        let (out, _) = run(&UnderOver, "setReference", &[]);
        assert!(matches!(out, Err(ModularError::Calldata(_))));
    }

    #[test]
    fn test_reverter_reports_custom_error() {
        let (out, _) = run(&Reverter, "alwaysRevert", &[]);
        let err = out.unwrap_err();
        assert_eq!(err.to_string(), REVERT_REASON);
    }

    #[test]
    fn test_failing_initializer_descriptor_lists_events() {
        let descriptor = FailingInitializer.descriptor();
        assert_eq!(descriptor.events, vec!["Poisoned"]);
        assert_eq!(descriptor.functions, vec!["poke", "initializer"]);
    }
}

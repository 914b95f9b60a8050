//! The registry module: atomic batch changes to an instance's selector map.
//!
//! A batch is validated and applied against a staged copy of the map. The
//! staged map is installed before the optional initializer runs, so setup
//! code can already reach the operations it is being registered with. Any
//! failure restores the instance to exactly the state it had before the
//! batch started, and no event is emitted.

use crate::{guard::OwnershipGuard, initializer::InitializerInvoker};
use modular_core::{
    CHANGE_MODULES, CallContext, ChangeAction, ChangeBatch, DIAMOND_CUT, Felt, Module,
    ModuleAction, ModuleDescriptor, ModularError, ModularResult, ModulesChanged, SelectorMap,
    Selector, MODULES_CHANGED,
};

/// Serves `changeModules` for the instances that route to it.
///
/// Every instance is constructed with this module pre-registered under
/// `changeModules`. `diamondCut` is accepted as an alias entry point but is
/// not advertised; it is only reachable once registered explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleRegistry;

impl ModuleRegistry {
    /// Apply `batch` to the instance behind `ctx`.
    ///
    /// Only the owner may call this. Actions apply in order, each checked
    /// against the map as left by the previous ones:
    ///
    /// - `Add` fails with `SelectorAlreadyRegistered` if the selector is mapped
    /// - `Replace` and `Remove` fail with `SelectorNotRegistered` if it is not
    /// - `Remove` ignores the action's module address
    /// - `Add`/`Replace` of the `initializer` selector fail with `ReservedSelector`
    ///
    /// Returns the summary that was emitted as `ModulesChanged`.
    ///
    /// The initializer runs as a library call under the submitter's
    /// identity, so it may itself call `changeModules`. Such a nested batch
    /// commits its own summary first; the outer summary then lists only the
    /// outer actions. Both events stand or fall with the outer batch.
    pub fn apply_batch(ctx: &mut CallContext<'_>, batch: ChangeBatch) -> ModularResult<ModulesChanged> {
        OwnershipGuard::require_owner(ctx.state(), ctx.caller())?;

        let mut staged = ctx.selectors().clone();
        for action in &batch.actions {
            if let Err(err) = apply_action(&mut staged, action) {
                tracing::warn!(%err, selector = %action.selector, action = %action.action, "batch rejected");
                return Err(err);
            }
        }

        let checkpoint = ctx.state().clone();
        ctx.state_mut().replace_selectors(staged);

        if let Some((target, args)) = &batch.initializer {
            if let Err(err) = InitializerInvoker::invoke(ctx, *target, args) {
                tracing::warn!(%err, %target, "initializer failed, batch rolled back");
                *ctx.state_mut() = checkpoint;
                return Err(err);
            }
        }

        let summary = ModulesChanged {
            actions: batch.actions,
        };
        ctx.emit(summary.clone());
        tracing::info!(
            contract = %ctx.contract_address(),
            actions = summary.actions.len(),
            initializer = batch.initializer.is_some(),
            "modules changed"
        );
        Ok(summary)
    }
}

fn apply_action(map: &mut SelectorMap, action: &ChangeAction) -> ModularResult<()> {
    let selector = action.selector;
    match action.action {
        ModuleAction::Add => {
            check_mappable(action)?;
            if map.contains(&selector) {
                return Err(ModularError::SelectorAlreadyRegistered(selector));
            }
            map.insert(selector, action.module);
        }
        ModuleAction::Replace => {
            check_mappable(action)?;
            if !map.contains(&selector) {
                return Err(ModularError::SelectorNotRegistered(selector));
            }
            map.insert(selector, action.module);
        }
        ModuleAction::Remove => {
            map.remove(&selector)
                .ok_or(ModularError::SelectorNotRegistered(selector))?;
        }
    }
    Ok(())
}

fn check_mappable(action: &ChangeAction) -> ModularResult<()> {
    if action.selector == Selector::initializer() {
        return Err(ModularError::ReservedSelector(action.selector));
    }
    if action.module.is_zero() {
        return Err(ModularError::InvalidModuleAddress(action.selector));
    }
    Ok(())
}

impl Module for ModuleRegistry {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new("ModuleRegistry")
            .function(CHANGE_MODULES)
            .event(MODULES_CHANGED)
    }

    fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>> {
        if selector == Selector::from_name(CHANGE_MODULES) || selector == Selector::from_name(DIAMOND_CUT) {
            let batch = ChangeBatch::decode(calldata)?;
            Self::apply_batch(ctx, batch)?;
            return Ok(Vec::new());
        }
        Err(ModularError::EntryPointNotFound {
            module: ctx.code_address(),
            selector,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingInitializer, UnderOver};
    use modular_core::{Address, Event, InstanceState, ModuleResolver, storage_var};
    use std::{collections::HashMap, sync::Arc};

    const OWNER: u64 = 1;
    const STRANGER: u64 = 2;
    const UNDER_OVER: u64 = 10;
    const FAILING: u64 = 11;

    fn modules() -> HashMap<Address, Arc<dyn Module>> {
        let mut modules: HashMap<Address, Arc<dyn Module>> = HashMap::new();
        modules.insert(Address::from(UNDER_OVER), Arc::new(UnderOver));
        modules.insert(Address::from(FAILING), Arc::new(FailingInitializer));
        modules
    }

    fn apply(
        state: &mut InstanceState,
        resolver: &dyn ModuleResolver,
        caller: u64,
        batch: ChangeBatch,
    ) -> ModularResult<ModulesChanged> {
        let mut ctx = CallContext::new(state, resolver, Address::from(100u64), Address::from(caller), 16);
        ModuleRegistry::apply_batch(&mut ctx, batch)
    }

    fn sel(name: &str) -> Selector {
        Selector::from_name(name)
    }

    #[test]
    fn test_add_then_remove_in_one_batch_nets_to_absent() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let m = Address::from(UNDER_OVER);

        let batch = ChangeBatch::new(vec![
            ChangeAction::add(m, sel("getReference")),
            ChangeAction::remove(m, sel("getReference")),
        ]);
        let summary = apply(&mut state, &modules, OWNER, batch).unwrap();

        assert_eq!(summary.actions.len(), 2);
        assert!(state.selectors().is_empty());
        assert_eq!(state.events().len(), 1);
    }

    #[test]
    fn test_conflicting_action_leaves_map_untouched() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let m = Address::from(UNDER_OVER);
        apply(&mut state, &modules, OWNER, ChangeBatch::new(vec![ChangeAction::add(m, sel("getReference"))])).unwrap();
        let before = state.clone();

        let err = apply(
            &mut state,
            &modules,
            OWNER,
            ChangeBatch::new(vec![
                ChangeAction::add(m, sel("setReference")),
                ChangeAction::add(m, sel("getReference")),
            ]),
        )
        .unwrap_err();

        assert!(matches!(err, ModularError::SelectorAlreadyRegistered(s) if s == sel("getReference")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_replace_and_remove_require_presence() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let m = Address::from(UNDER_OVER);

        for action in [ChangeAction::replace(m, sel("x")), ChangeAction::remove(m, sel("x"))] {
            let err = apply(&mut state, &modules, OWNER, ChangeBatch::new(vec![action])).unwrap_err();
            assert!(matches!(err, ModularError::SelectorNotRegistered(_)));
        }
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_replace_repoints_selector() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let (a, b) = (Address::from(UNDER_OVER), Address::from(FAILING));

        apply(&mut state, &modules, OWNER, ChangeBatch::new(vec![ChangeAction::add(a, sel("x"))])).unwrap();
        apply(&mut state, &modules, OWNER, ChangeBatch::new(vec![ChangeAction::replace(b, sel("x"))])).unwrap();
        assert_eq!(state.selectors().get(&sel("x")), Some(b));
    }

    #[test]
    fn test_remove_ignores_module_address() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        apply(
            &mut state,
            &modules,
            OWNER,
            ChangeBatch::new(vec![ChangeAction::add(Address::from(UNDER_OVER), sel("x"))]),
        )
        .unwrap();

        apply(
            &mut state,
            &modules,
            OWNER,
            ChangeBatch::new(vec![ChangeAction::remove(Address::from(999u64), sel("x"))]),
        )
        .unwrap();
        assert!(!state.selectors().contains(&sel("x")));
    }

    #[test]
    fn test_initializer_selector_is_reserved() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let err = apply(
            &mut state,
            &modules,
            OWNER,
            ChangeBatch::new(vec![ChangeAction::add(Address::from(UNDER_OVER), Selector::initializer())]),
        )
        .unwrap_err();
        assert!(matches!(err, ModularError::ReservedSelector(_)));
    }

    #[test]
    fn test_zero_module_address_rejected() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let err = apply(
            &mut state,
            &modules,
            OWNER,
            ChangeBatch::new(vec![ChangeAction::add(Address::ZERO, sel("x"))]),
        )
        .unwrap_err();
        assert!(matches!(err, ModularError::InvalidModuleAddress(_)));
    }

    #[test]
    fn test_non_owner_is_unauthorized() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let before = state.clone();

        let err = apply(
            &mut state,
            &modules,
            STRANGER,
            ChangeBatch::new(vec![ChangeAction::add(Address::from(UNDER_OVER), sel("x"))]),
        )
        .unwrap_err();

        assert!(matches!(err, ModularError::Unauthorized { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_initializer_runs_against_instance_storage() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let m = Address::from(UNDER_OVER);

        let batch = ChangeBatch::new(vec![ChangeAction::add(m, sel("getReference"))])
            .with_initializer(m, vec![Felt::from(100u64)]);
        apply(&mut state, &modules, OWNER, batch).unwrap();

        assert_eq!(state.storage().read(storage_var("reference")), Felt::from(100u64));
    }

    #[test]
    fn test_failed_initializer_rolls_back_everything() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let before = state.clone();
        let m = Address::from(FAILING);

        let batch = ChangeBatch::new(vec![ChangeAction::add(m, sel("poke"))]).with_initializer(m, vec![]);
        let err = apply(&mut state, &modules, OWNER, batch).unwrap_err();

        assert!(matches!(err, ModularError::InitializerFailed(_)));
        // The failing initializer writes storage before reverting.
        assert_eq!(state, before);
    }

    #[test]
    fn test_emitted_event_lists_applied_actions() {
        let modules = modules();
        let mut state = InstanceState::new(Address::from(OWNER));
        let actions = vec![ChangeAction::add(Address::from(UNDER_OVER), sel("underOver"))];

        apply(&mut state, &modules, OWNER, ChangeBatch::new(actions.clone())).unwrap();

        let expected: Event = ModulesChanged { actions }.into();
        assert_eq!(state.events(), &[expected]);
    }
}

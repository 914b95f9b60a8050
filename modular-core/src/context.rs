//! # Call Context
//!
//! The view a module gets of the world while one of its entry points runs:
//! the calling principal, the instance whose state it operates on, and a
//! way to make synchronous nested calls into other module code.
//!
//! A nested [`library_call`](CallContext::library_call) keeps the original
//! caller and the same instance state. The callee sees exactly what the
//! outermost entry point saw.

use crate::{
    error::{ModularError, ModularResult},
    event::Event,
    felt::Felt,
    module::ModuleResolver,
    selector::{Address, Selector},
    state::{InstanceState, SelectorMap},
};

/// Execution context of one entry point.
pub struct CallContext<'a> {
    state: &'a mut InstanceState,
    resolver: &'a dyn ModuleResolver,
    contract: Address,
    code: Address,
    caller: Address,
    depth: usize,
    max_depth: usize,
}

impl<'a> CallContext<'a> {
    /// A top-level context for a call made by `caller` into `contract`.
    pub fn new(
        state: &'a mut InstanceState,
        resolver: &'a dyn ModuleResolver,
        contract: Address,
        caller: Address,
        max_depth: usize,
    ) -> Self {
        Self {
            state,
            resolver,
            contract,
            code: contract,
            caller,
            depth: 0,
            max_depth,
        }
    }

    /// The principal that made the outermost call.
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// The instance whose state is being operated on.
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// Address of the module code currently running.
    ///
    /// Equals [`contract_address`](Self::contract_address) until the first
    /// library call.
    pub fn code_address(&self) -> Address {
        self.code
    }

    /// Nesting depth; zero for the outermost entry point.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Owner of the instance.
    pub fn owner(&self) -> Address {
        self.state.owner()
    }

    /// Instance state.
    pub fn state(&self) -> &InstanceState {
        &*self.state
    }

    /// Mutable instance state.
    pub fn state_mut(&mut self) -> &mut InstanceState {
        &mut *self.state
    }

    /// The instance's selector map.
    pub fn selectors(&self) -> &SelectorMap {
        self.state.selectors()
    }

    /// Read a storage slot.
    pub fn storage_read(&self, key: Felt) -> Felt {
        self.state.storage().read(key)
    }

    /// Write a storage slot.
    pub fn storage_write(&mut self, key: Felt, value: Felt) {
        self.state.storage_mut().write(key, value);
    }

    /// Append an event to the instance's log.
    pub fn emit(&mut self, event: impl Into<Event>) {
        self.state.emit(event.into());
    }

    /// Run `selector` of the module at `module` against this instance's
    /// state, under the same caller.
    pub fn library_call(
        &mut self,
        module: Address,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>> {
        if self.depth >= self.max_depth {
            return Err(ModularError::CallDepthExceeded(self.max_depth));
        }
        let code = self
            .resolver
            .resolve(module)
            .ok_or(ModularError::ModuleNotDeployed(module))?;

        let mut nested = CallContext {
            state: &mut *self.state,
            resolver: self.resolver,
            contract: self.contract,
            code: module,
            caller: self.caller,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        };
        code.invoke(&mut nested, selector, calldata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Module, ModuleDescriptor};
    use std::{collections::HashMap, sync::Arc};

    /// Calls itself until the depth limit trips.
    struct Recurse;

    impl Module for Recurse {
        fn descriptor(&self) -> ModuleDescriptor {
            ModuleDescriptor::new("Recurse").function("recurse")
        }

        fn invoke(
            &self,
            ctx: &mut CallContext<'_>,
            selector: Selector,
            calldata: &[Felt],
        ) -> ModularResult<Vec<Felt>> {
            ctx.library_call(Address::from(1u64), selector, calldata)
        }
    }

    /// Reports who it was called by.
    struct WhoAmI;

    impl Module for WhoAmI {
        fn descriptor(&self) -> ModuleDescriptor {
            ModuleDescriptor::new("WhoAmI").function("whoami")
        }

        fn invoke(
            &self,
            ctx: &mut CallContext<'_>,
            _selector: Selector,
            _calldata: &[Felt],
        ) -> ModularResult<Vec<Felt>> {
            Ok(vec![ctx.caller().felt(), Felt::from(ctx.depth())])
        }
    }

    fn resolver() -> HashMap<Address, Arc<dyn Module>> {
        let mut modules: HashMap<Address, Arc<dyn Module>> = HashMap::new();
        modules.insert(Address::from(1u64), Arc::new(Recurse));
        modules.insert(Address::from(2u64), Arc::new(WhoAmI));
        modules
    }

    #[test]
    fn test_library_call_preserves_caller() {
        let modules = resolver();
        let mut state = InstanceState::new(Address::from(7u64));
        let mut ctx = CallContext::new(&mut state, &modules, Address::from(99u64), Address::from(7u64), 8);

        let out = ctx
            .library_call(Address::from(2u64), Selector::from_name("whoami"), &[])
            .unwrap();
        assert_eq!(out, vec![Felt::from(7u64), Felt::ONE]);
    }

    #[test]
    fn test_library_call_depth_limit() {
        let modules = resolver();
        let mut state = InstanceState::new(Address::from(7u64));
        let mut ctx = CallContext::new(&mut state, &modules, Address::from(99u64), Address::from(7u64), 4);

        let err = ctx
            .library_call(Address::from(1u64), Selector::from_name("recurse"), &[])
            .unwrap_err();
        assert!(matches!(err, ModularError::CallDepthExceeded(4)));
    }

    #[test]
    fn test_library_call_unknown_module() {
        let modules = resolver();
        let mut state = InstanceState::new(Address::from(7u64));
        let mut ctx = CallContext::new(&mut state, &modules, Address::from(99u64), Address::from(7u64), 4);

        let err = ctx
            .library_call(Address::from(3u64), Selector::from_name("x"), &[])
            .unwrap_err();
        assert!(matches!(err, ModularError::ModuleNotDeployed(a) if a == Address::from(3u64)));
    }

    #[test]
    fn test_identities_seen_by_the_top_level_call() {
        let modules = resolver();
        let mut state = InstanceState::new(Address::from(7u64));
        let ctx = CallContext::new(&mut state, &modules, Address::from(99u64), Address::from(5u64), 4);

        assert_eq!(ctx.owner(), Address::from(7u64));
        assert_eq!(ctx.caller(), Address::from(5u64));
        assert_eq!(ctx.contract_address(), Address::from(99u64));
        assert_eq!(ctx.code_address(), Address::from(99u64));
        assert_eq!(ctx.depth(), 0);
    }
}

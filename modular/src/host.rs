//! The execution environment.
//!
//! A [`Host`] deploys modules and instances and runs invocations against
//! them. Each top-level invocation is a transactional boundary: it runs
//! against a scratch copy of the target instance, and the copy replaces the
//! published state only if the invocation succeeds.
//!
//! Instances are serialized individually. Each sits behind its own mutex,
//! so a long invocation on one instance never blocks another.

use crate::{
    config::{HostBuilder, HostConfig},
    dispatch::DispatchProxy,
};
use modular_core::{
    Address, CHANGE_MODULES, CallContext, Event, Felt, InstanceState, Module, ModuleDescriptor,
    ModuleResolver, ModularError, ModularResult, Selector,
};
use modular_std::introspection;
use parking_lot::{Mutex, RwLock};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionInfo {
    /// Values returned by the entry point.
    pub retdata: Vec<Felt>,
    /// Events emitted during the invocation, in order.
    pub events: Vec<Event>,
}

/// Deployed module code, shared by every instance.
#[derive(Default)]
struct ModuleTable {
    modules: RwLock<HashMap<Address, Arc<dyn Module>>>,
}

impl ModuleResolver for ModuleTable {
    fn resolve(&self, address: Address) -> Option<Arc<dyn Module>> {
        self.modules.read().get(&address).cloned()
    }
}

/// In-process execution environment for modules and instances.
pub struct Host {
    config: HostConfig,
    modules: ModuleTable,
    instances: RwLock<HashMap<Address, Arc<Mutex<InstanceState>>>>,
    next_address: AtomicU64,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// A host with default configuration.
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// A host with the given configuration.
    pub fn with_config(config: HostConfig) -> Self {
        let next_address = AtomicU64::new(config.address_base);
        Self {
            config,
            modules: ModuleTable::default(),
            instances: RwLock::new(HashMap::new()),
            next_address,
        }
    }

    /// Start configuring a host.
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn allocate_address(&self) -> Address {
        Address::from(self.next_address.fetch_add(1, Ordering::Relaxed))
    }

    // ------------------------------------------------------------------
    // Deployment
    // ------------------------------------------------------------------

    /// Deploy module code and return its address.
    pub fn deploy_module<M: Module>(&self, module: M) -> Address {
        let address = self.allocate_address();
        let name = module.descriptor().name;
        self.modules.modules.write().insert(address, Arc::new(module));
        tracing::info!(%address, module = %name, "module deployed");
        address
    }

    /// Deploy an instance owned by `owner`, with `changeModules` served by
    /// the registry module at `registry`.
    pub fn deploy_instance(&self, owner: Address, registry: Address) -> ModularResult<Address> {
        self.deploy_instance_with(owner, registry, CHANGE_MODULES)
    }

    /// Deploy an instance whose batch entry point is named `entry_point`.
    ///
    /// Use [`DIAMOND_CUT`](modular_core::DIAMOND_CUT) for instances that
    /// answer `diamondCut` from the start.
    pub fn deploy_instance_with(
        &self,
        owner: Address,
        registry: Address,
        entry_point: &str,
    ) -> ModularResult<Address> {
        if self.modules.resolve(registry).is_none() {
            return Err(ModularError::ModuleNotDeployed(registry));
        }
        let mut state = InstanceState::new(owner);
        state
            .selectors_mut()
            .insert(Selector::from_name(entry_point), registry);

        let address = self.allocate_address();
        self.instances
            .write()
            .insert(address, Arc::new(Mutex::new(state)));
        tracing::info!(%address, %owner, %registry, entry_point, "instance deployed");
        Ok(address)
    }

    /// Public descriptor of the module at `module`.
    pub fn descriptor(&self, module: Address) -> ModularResult<ModuleDescriptor> {
        self.modules
            .resolve(module)
            .map(|code| code.descriptor())
            .ok_or(ModularError::ModuleNotDeployed(module))
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Invoke `entry_point` on `contract` as `caller`, committing on success.
    pub fn invoke(
        &self,
        contract: Address,
        entry_point: &str,
        calldata: &[Felt],
        caller: Address,
    ) -> ModularResult<ExecutionInfo> {
        self.execute(contract, Selector::from_name(entry_point), calldata, caller, true)
    }

    /// Like [`invoke`](Self::invoke), addressed by raw selector.
    pub fn invoke_selector(
        &self,
        contract: Address,
        selector: Selector,
        calldata: &[Felt],
        caller: Address,
    ) -> ModularResult<ExecutionInfo> {
        self.execute(contract, selector, calldata, caller, true)
    }

    /// Run `entry_point` on `contract` and discard every state change.
    pub fn call(
        &self,
        contract: Address,
        entry_point: &str,
        calldata: &[Felt],
        caller: Address,
    ) -> ModularResult<ExecutionInfo> {
        self.execute(contract, Selector::from_name(entry_point), calldata, caller, false)
    }

    /// Like [`call`](Self::call), addressed by raw selector.
    pub fn call_selector(
        &self,
        contract: Address,
        selector: Selector,
        calldata: &[Felt],
        caller: Address,
    ) -> ModularResult<ExecutionInfo> {
        self.execute(contract, selector, calldata, caller, false)
    }

    fn execute(
        &self,
        contract: Address,
        selector: Selector,
        calldata: &[Felt],
        caller: Address,
        commit: bool,
    ) -> ModularResult<ExecutionInfo> {
        let instance = self.instance(contract)?;
        let span = tracing::info_span!("invoke", %contract, %selector, %caller, commit);
        let _enter = span.enter();

        let mut published = instance.lock();
        let mut staged = published.clone();
        let events_before = staged.events().len();

        let result = {
            let mut ctx = CallContext::new(
                &mut staged,
                &self.modules,
                contract,
                caller,
                self.config.max_call_depth,
            );
            DispatchProxy::dispatch(&mut ctx, selector, calldata)
        };

        match result {
            Ok(retdata) => {
                let events = staged.events()[events_before..].to_vec();
                if commit {
                    *published = staged;
                }
                Ok(ExecutionInfo { retdata, events })
            }
            Err(err) => {
                tracing::warn!(%err, "invocation reverted");
                Err(err)
            }
        }
    }

    fn instance(&self, contract: Address) -> ModularResult<Arc<Mutex<InstanceState>>> {
        self.instances
            .read()
            .get(&contract)
            .cloned()
            .ok_or(ModularError::ContractNotDeployed(contract))
    }

    fn read<T>(&self, contract: Address, f: impl FnOnce(&InstanceState) -> T) -> ModularResult<T> {
        let instance = self.instance(contract)?;
        let state = instance.lock();
        Ok(f(&state))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Owner of `contract`.
    pub fn owner(&self, contract: Address) -> ModularResult<Address> {
        self.read(contract, |state| state.owner())
    }

    /// Distinct module addresses registered on `contract`.
    pub fn module_addresses(&self, contract: Address) -> ModularResult<Vec<Address>> {
        self.read(contract, |state| introspection::module_addresses(state.selectors()))
    }

    /// Selectors of `contract` served by `module`.
    pub fn module_function_selectors(
        &self,
        contract: Address,
        module: Address,
    ) -> ModularResult<Vec<Selector>> {
        self.read(contract, |state| {
            introspection::module_function_selectors(state.selectors(), module)
        })
    }

    /// Module of `contract` serving `selector`.
    pub fn module_address(&self, contract: Address, selector: Selector) -> ModularResult<Address> {
        self.read(contract, |state| {
            introspection::module_address(state.selectors(), selector)
        })?
    }

    /// Every event `contract` has emitted.
    pub fn events(&self, contract: Address) -> ModularResult<Vec<Event>> {
        self.read(contract, |state| state.events().to_vec())
    }

    /// A storage slot of `contract`.
    pub fn storage_at(&self, contract: Address, key: Felt) -> ModularResult<Felt> {
        self.read(contract, |state| state.storage().read(key))
    }

    /// A copy of the full published state of `contract`.
    pub fn snapshot(&self, contract: Address) -> ModularResult<InstanceState> {
        self.read(contract, |state| state.clone())
    }

    /// Deep-copy this host.
    ///
    /// Module code is shared; instance state is copied, so the fork and the
    /// original evolve independently from here on.
    pub fn fork(&self) -> Host {
        let modules = self.modules.modules.read().clone();
        let instances = self
            .instances
            .read()
            .iter()
            .map(|(address, state)| (*address, Arc::new(Mutex::new(state.lock().clone()))))
            .collect();
        Host {
            config: self.config.clone(),
            modules: ModuleTable {
                modules: RwLock::new(modules),
            },
            instances: RwLock::new(instances),
            next_address: AtomicU64::new(self.next_address.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modular_std::{ModuleRegistry, testing::UnderOver};

    #[test]
    fn test_addresses_are_allocated_from_base() {
        let host = Host::builder().address_base(0x50).build();
        let registry = host.deploy_module(ModuleRegistry);
        let instance = host.deploy_instance(Address::from(1u64), registry).unwrap();
        assert_eq!(registry, Address::from(0x50u64));
        assert_eq!(instance, Address::from(0x51u64));
    }

    #[test]
    fn test_instance_requires_deployed_registry() {
        let host = Host::new();
        let err = host
            .deploy_instance(Address::from(1u64), Address::from(0xdeadu64))
            .unwrap_err();
        assert!(matches!(err, ModularError::ModuleNotDeployed(_)));
    }

    #[test]
    fn test_unknown_contract() {
        let host = Host::new();
        let err = host
            .invoke(Address::from(9u64), "getReference", &[], Address::from(1u64))
            .unwrap_err();
        assert!(matches!(err, ModularError::ContractNotDeployed(_)));
    }

    #[test]
    fn test_descriptor_lookup() {
        let host = Host::new();
        let module = host.deploy_module(UnderOver);
        assert_eq!(host.descriptor(module).unwrap().name, "UnderOver");
        assert!(host.descriptor(Address::from(1u64)).is_err());
    }
}

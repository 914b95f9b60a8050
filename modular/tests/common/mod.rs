#![allow(dead_code)]

use modular::{
    Address, CHANGE_MODULES, ChangeAction, ChangeBatch, ExecutionInfo, Felt, Host,
    ModularResult, ModuleIntrospection, ModuleRegistry, Selector,
    testing::UnderOver,
};

// ============================================================================
// Accounts
// ============================================================================

pub fn alice() -> Address {
    Address::from(1189998819991197253u128)
}

pub fn bob() -> Address {
    Address::from(118999881999119725311u128)
}

pub fn charlie() -> Address {
    Address::from(0xc4a7u64)
}

// ============================================================================
// Fixture
// ============================================================================

/// One host with the standard modules deployed and one instance per owner.
pub struct Fixture {
    pub host: Host,
    pub registry: Address,
    pub introspection: Address,
    pub under_over: Address,
    /// Owned by alice.
    pub i: Address,
    /// Owned by bob.
    pub j: Address,
}

pub fn fixture() -> Fixture {
    let host = Host::new();
    let registry = host.deploy_module(ModuleRegistry);
    let introspection = host.deploy_module(ModuleIntrospection);
    let under_over = host.deploy_module(UnderOver);
    let i = host.deploy_instance(alice(), registry).unwrap();
    let j = host.deploy_instance(bob(), registry).unwrap();
    Fixture {
        host,
        registry,
        introspection,
        under_over,
        i,
        j,
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn sel(name: &str) -> Selector {
    Selector::from_name(name)
}

pub fn felts(values: &[u64]) -> Vec<Felt> {
    values.iter().copied().map(Felt::from).collect()
}

/// ADD actions for `names`, all pointing at `module`.
pub fn adds(module: Address, names: &[&str]) -> Vec<ChangeAction> {
    names.iter().map(|n| ChangeAction::add(module, sel(n))).collect()
}

/// REMOVE actions for `names`.
pub fn removes(module: Address, names: &[&str]) -> Vec<ChangeAction> {
    names.iter().map(|n| ChangeAction::remove(module, sel(n))).collect()
}

pub const UNDER_OVER_FNS: [&str; 3] = ["setReference", "getReference", "underOver"];

pub const INTROSPECTION_FNS: [&str; 3] =
    ["moduleFunctionSelectors", "moduleAddresses", "moduleAddress"];

pub fn change_modules(
    host: &Host,
    contract: Address,
    batch: &ChangeBatch,
    caller: Address,
) -> ModularResult<ExecutionInfo> {
    host.invoke(contract, CHANGE_MODULES, &batch.encode(), caller)
}

pub fn get_reference(host: &Host, contract: Address, caller: Address) -> ModularResult<Felt> {
    let info = host.call(contract, "getReference", &[], caller)?;
    assert_eq!(info.retdata.len(), 1);
    Ok(info.retdata[0])
}

//! Read-only queries over a selector map.
//!
//! The free functions are pure reads and back both the host's query API and
//! the [`ModuleIntrospection`] module, which exposes them to callers as
//! `moduleAddresses`, `moduleFunctionSelectors` and `moduleAddress`.

use indexmap::IndexSet;
use modular_core::{
    Address, CalldataReader, CallContext, Felt, Module, ModuleDescriptor, ModularError,
    ModularResult, Selector, SelectorMap, encode_array,
};

/// Entry point name of [`module_addresses`].
pub const MODULE_ADDRESSES: &str = "moduleAddresses";
/// Entry point name of [`module_function_selectors`].
pub const MODULE_FUNCTION_SELECTORS: &str = "moduleFunctionSelectors";
/// Entry point name of [`module_address`].
pub const MODULE_ADDRESS: &str = "moduleAddress";

/// Every distinct module address in the map, in first-registration order.
pub fn module_addresses(map: &SelectorMap) -> Vec<Address> {
    map.iter()
        .map(|(_, module)| module)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Every selector mapped to `module`, in registration order.
pub fn module_function_selectors(map: &SelectorMap, module: Address) -> Vec<Selector> {
    map.iter()
        .filter(|(_, m)| *m == module)
        .map(|(s, _)| s)
        .collect()
}

/// The module serving `selector`.
pub fn module_address(map: &SelectorMap, selector: Selector) -> ModularResult<Address> {
    map.get(&selector)
        .ok_or(ModularError::SelectorNotRegistered(selector))
}

/// Exposes the introspection queries as entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleIntrospection;

impl Module for ModuleIntrospection {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new("ModuleIntrospection")
            .function(MODULE_FUNCTION_SELECTORS)
            .function(MODULE_ADDRESSES)
            .function(MODULE_ADDRESS)
    }

    fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>> {
        let mut args = CalldataReader::new(calldata);
        let out = if selector == Selector::from_name(MODULE_ADDRESSES) {
            encode_array(module_addresses(ctx.selectors()))
        } else if selector == Selector::from_name(MODULE_FUNCTION_SELECTORS) {
            let module = args.address()?;
            encode_array(module_function_selectors(ctx.selectors(), module))
        } else if selector == Selector::from_name(MODULE_ADDRESS) {
            let queried = args.selector()?;
            vec![module_address(ctx.selectors(), queried)?.felt()]
        } else {
            return Err(ModularError::EntryPointNotFound {
                module: ctx.code_address(),
                selector,
            });
        };
        args.finish()?;
        Ok(out)
    }
}

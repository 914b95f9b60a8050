//! # Module Layer
//!
//! A module is independently deployed code exposing named entry points. It
//! holds no state: every entry point runs against the state of the instance
//! that routed the call to it, so the same module address can back any
//! number of instances.
//!
//! Modules are addressed by [`Selector`], never by Rust type. An instance
//! only ever sees `invoke(selector, calldata)`; which module answers is a
//! lookup in its selector map.

use crate::{
    context::CallContext,
    error::ModularResult,
    felt::Felt,
    selector::{Address, INITIALIZER, Selector},
};
use std::{collections::HashMap, sync::Arc};

/// Public description of a module: its entry points and events.
///
/// Clients read descriptors to know which selectors to register and which
/// names they can call. The registry itself never consults them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Human-readable module name.
    pub name: String,
    /// Entry point names, including `initializer` if present.
    pub functions: Vec<String>,
    /// Event names the module may emit.
    pub events: Vec<String>,
}

impl ModuleDescriptor {
    /// An empty descriptor named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Add an entry point.
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.functions.push(name.into());
        self
    }

    /// Add an event.
    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    /// Whether the module exposes `name`.
    pub fn exposes(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f == name)
    }

    /// Whether the module has a setup entry point.
    pub fn has_initializer(&self) -> bool {
        self.exposes(INITIALIZER)
    }

    /// Selectors a registry should map for this module.
    ///
    /// The `initializer` entry point is excluded.
    pub fn registrable_selectors(&self) -> impl Iterator<Item = Selector> + '_ {
        self.functions
            .iter()
            .filter(|f| f.as_str() != INITIALIZER)
            .map(|f| Selector::from_name(f))
    }
}

/// Deployed module code.
///
/// # Example
///
/// ```rust,ignore
/// struct Echo;
///
/// impl Module for Echo {
///     fn descriptor(&self) -> ModuleDescriptor {
///         ModuleDescriptor::new("Echo").function("echo")
///     }
///
///     fn invoke(&self, ctx: &mut CallContext<'_>, selector: Selector, calldata: &[Felt])
///         -> ModularResult<Vec<Felt>>
///     {
///         Ok(calldata.to_vec())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a deployable module",
    label = "missing `Module` implementation",
    note = "Implement `Module` by hand or annotate an impl block with `#[module]`."
)]
pub trait Module: Send + Sync + 'static {
    /// Describe the entry points and events of this module.
    fn descriptor(&self) -> ModuleDescriptor;

    /// Run the entry point identified by `selector`.
    ///
    /// Unknown selectors must fail with
    /// [`ModularError::EntryPointNotFound`](crate::ModularError::EntryPointNotFound).
    fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>>;
}

impl<M: Module + ?Sized> Module for Arc<M> {
    fn descriptor(&self) -> ModuleDescriptor {
        (**self).descriptor()
    }

    fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> ModularResult<Vec<Felt>> {
        (**self).invoke(ctx, selector, calldata)
    }
}

/// Looks up module code by address for nested calls.
pub trait ModuleResolver: Send + Sync {
    /// The module deployed at `address`, if any.
    fn resolve(&self, address: Address) -> Option<Arc<dyn Module>>;
}

impl ModuleResolver for HashMap<Address, Arc<dyn Module>> {
    fn resolve(&self, address: Address) -> Option<Arc<dyn Module>> {
        self.get(&address).cloned()
    }
}

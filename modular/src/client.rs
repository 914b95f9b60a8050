//! Client sessions over a deployed instance.
//!
//! A [`ModularContract`] tracks which entry points and events an instance
//! exposes, so callers can name functions instead of selectors and get an
//! early error for a typo. The [`Abi`] lives in the session only; the
//! instance itself knows nothing about names.

use crate::host::{ExecutionInfo, Host};
use modular_core::{
    Address, CHANGE_MODULES, ChangeAction, ChangeBatch, Event, Felt, INITIALIZER, ModularError,
    ModuleDescriptor, Selector,
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised by a client session.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The session ABI has no function with this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The host rejected the invocation.
    #[error(transparent)]
    Modular(#[from] ModularError),
}

/// Names an instance is known to expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    functions: BTreeSet<String>,
    events: BTreeSet<String>,
}

impl Abi {
    /// An empty ABI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every function (except `initializer`) and event of `descriptor`.
    pub fn merge(&mut self, descriptor: &ModuleDescriptor) {
        self.functions.extend(
            descriptor
                .functions
                .iter()
                .filter(|f| f.as_str() != INITIALIZER)
                .cloned(),
        );
        self.events.extend(descriptor.events.iter().cloned());
    }

    /// Drop the functions of `descriptor`. Its events stay known, since
    /// past emissions remain in the log.
    pub fn remove_functions(&mut self, descriptor: &ModuleDescriptor) {
        for function in &descriptor.functions {
            self.functions.remove(function);
        }
    }

    /// Whether `name` is a known function.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    /// Whether `name` is a known event.
    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains(name)
    }

    /// Known functions, sorted.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(String::as_str)
    }

    /// Known events, sorted.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(String::as_str)
    }

    /// The known name `event` was emitted under.
    pub fn event_name(&self, event: &Event) -> Option<&str> {
        self.events().find(|name| event.is(name))
    }
}

/// A session bound to one instance on a [`Host`].
pub struct ModularContract<'h> {
    host: &'h Host,
    address: Address,
    abi: Abi,
}

impl<'h> ModularContract<'h> {
    /// Attach to `address`, learning the ABI of its registered modules.
    ///
    /// Only functions whose selector is currently mapped are included.
    pub fn attach(host: &'h Host, address: Address) -> Result<Self, ClientError> {
        let mut abi = Abi::new();
        for module in host.module_addresses(address)? {
            let descriptor = host.descriptor(module)?;
            let mapped: BTreeSet<Selector> = host
                .module_function_selectors(address, module)?
                .into_iter()
                .collect();
            let visible = ModuleDescriptor {
                functions: descriptor
                    .functions
                    .iter()
                    .filter(|f| mapped.contains(&Selector::from_name(f)))
                    .cloned()
                    .collect(),
                ..descriptor
            };
            abi.merge(&visible);
        }
        Ok(Self { host, address, abi })
    }

    /// The instance this session is bound to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The session ABI.
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Register every entry point of `module` in one batch.
    ///
    /// With `initializer_args`, the module's own initializer runs with them
    /// as part of the batch. On success the module's functions and events
    /// join the session ABI.
    pub fn add_module(
        &mut self,
        module: Address,
        initializer_args: Option<Vec<Felt>>,
        caller: Address,
    ) -> Result<ExecutionInfo, ClientError> {
        let descriptor = self.host.descriptor(module)?;
        let actions = descriptor
            .registrable_selectors()
            .map(|selector| ChangeAction::add(module, selector))
            .collect();
        let mut batch = ChangeBatch::new(actions);
        if let Some(args) = initializer_args {
            batch = batch.with_initializer(module, args);
        }

        let info = self.change_modules(&batch, caller)?;
        self.abi.merge(&descriptor);
        Ok(info)
    }

    /// Unregister every entry point of `module` in one batch.
    pub fn remove_module(
        &mut self,
        module: Address,
        caller: Address,
    ) -> Result<ExecutionInfo, ClientError> {
        let descriptor = self.host.descriptor(module)?;
        let actions = descriptor
            .registrable_selectors()
            .map(|selector| ChangeAction::remove(module, selector))
            .collect();

        let info = self.change_modules(&ChangeBatch::new(actions), caller)?;
        self.abi.remove_functions(&descriptor);
        Ok(info)
    }

    fn change_modules(
        &self,
        batch: &ChangeBatch,
        caller: Address,
    ) -> Result<ExecutionInfo, ClientError> {
        tracing::debug!(contract = %self.address, actions = batch.actions.len(), "submitting batch");
        Ok(self
            .host
            .invoke(self.address, CHANGE_MODULES, &batch.encode(), caller)?)
    }

    /// Invoke a known function, committing on success.
    pub fn invoke(
        &self,
        name: &str,
        calldata: &[Felt],
        caller: Address,
    ) -> Result<ExecutionInfo, ClientError> {
        self.check(name)?;
        Ok(self.host.invoke(self.address, name, calldata, caller)?)
    }

    /// Run a known function without committing.
    pub fn call(
        &self,
        name: &str,
        calldata: &[Felt],
        caller: Address,
    ) -> Result<ExecutionInfo, ClientError> {
        self.check(name)?;
        Ok(self.host.call(self.address, name, calldata, caller)?)
    }

    fn check(&self, name: &str) -> Result<(), ClientError> {
        if self.abi.has_function(name) {
            Ok(())
        } else {
            Err(ClientError::UnknownFunction(name.to_string()))
        }
    }
}

//! # modular - Authorization-Gated Dispatch Registry
//!
//! `modular` runs contract instances whose behavior is assembled from
//! independently deployed modules. An instance owns a selector map and
//! routes every call through it; its owner adds, replaces and removes
//! entries in atomic batches, optionally running a module's initializer as
//! part of the same batch.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modular::prelude::*;
//! use modular::testing::UnderOver;
//!
//! let host = Host::new();
//! let registry = host.deploy_module(ModuleRegistry);
//! let under_over = host.deploy_module(UnderOver);
//! let owner = Address::from(1u64);
//! let instance = host.deploy_instance(owner, registry)?;
//!
//! let mut contract = ModularContract::attach(&host, instance)?;
//! contract.add_module(under_over, Some(vec![Felt::from(10u64)]), owner)?;
//! let out = contract.call("underOver", &[Felt::from(3u64)], owner)?;
//! assert_eq!(out.retdata, vec![Felt::ONE, Felt::ZERO]);
//! ```
//!
//! ## Layers
//!
//! - [`modular_core`]: values, state and the [`Module`] trait
//! - [`modular_std`]: registry, guard, initializer and introspection modules
//! - this crate: the [`Host`], dispatch and client sessions

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod client;
mod config;
mod dispatch;
mod host;

pub use client::{Abi, ClientError, ModularContract};
pub use config::{HostBuilder, HostConfig};
pub use dispatch::DispatchProxy;
pub use host::{ExecutionInfo, Host};

pub use modular_core::{
    Address, BoxError, CHANGE_MODULES, CallContext, CalldataError, CalldataReader, ChangeAction,
    ChangeBatch, DIAMOND_CUT, Event, Felt, INITIALIZER, InstanceState, MODULES_CHANGED,
    ModularError, ModularResult, Module, ModuleAction, ModuleDescriptor, ModuleResolver,
    ModulesChanged, Selector, SelectorMap, Storage, decode_actions, encode_actions, encode_array,
    storage_var,
};
pub use modular_std::{InitializerInvoker, ModuleIntrospection, ModuleRegistry, OwnershipGuard};

/// Introspection queries and entry point names.
pub mod introspection {
    pub use modular_std::introspection::{
        MODULE_ADDRESS, MODULE_ADDRESSES, MODULE_FUNCTION_SELECTORS, module_address,
        module_addresses, module_function_selectors,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use modular_std::testing::*;
}

/// Prelude module - common imports for modular.
///
/// # Usage
///
/// ```rust,ignore
/// use modular::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Values
        Address,
        // Batches
        ChangeAction,
        ChangeBatch,
        // Client
        ClientError,
        Event,
        Felt,
        // Host
        Host,
        ModularContract,
        // Errors
        ModularError,
        ModularResult,
        // Modules
        Module,
        ModuleIntrospection,
        ModuleRegistry,
        Selector,
    };
}

#[cfg(feature = "macros")]
pub use modular_macros::module;

#[doc(hidden)]
pub use modular_core as __core;

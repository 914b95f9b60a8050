//! # modular-core
//!
//! Core types and traits for modular dispatch-registry contracts.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! module authors who do not need the host or the standard modules.
//!
//! # Model
//!
//! - **Instance**: a deployed contract with an owner, a selector map, storage
//!   and an event log ([`InstanceState`]). It implements nothing itself.
//! - **Module**: stateless code at an [`Address`] exposing entry points
//!   ([`Module`]). Modules run against the state of the instance that
//!   routed to them.
//! - **Selector**: the identifier of a named entry point ([`Selector`]).
//!   Instances route by selector, through their [`SelectorMap`].
//! - **Batch**: an ordered list of [`ChangeAction`]s plus an optional
//!   initializer call ([`ChangeBatch`]), applied all-or-nothing.
//!
//! # Error Types
//!
//! - [`ModularError`] - Every invocation failure
//! - [`CalldataError`] - Malformed payloads

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod action;
mod calldata;
mod context;
mod error;
mod event;
mod felt;
mod module;
mod selector;
mod state;

// Re-exports
pub use action::{ChangeAction, ChangeBatch, ModuleAction, decode_actions, encode_actions};
pub use calldata::{CalldataReader, encode_array};
pub use context::CallContext;
pub use error::{BoxError, CalldataError, ModularError, ModularResult};
pub use event::{Event, ModulesChanged};
pub use felt::Felt;
pub use module::{Module, ModuleDescriptor, ModuleResolver};
pub use selector::{Address, CHANGE_MODULES, DIAMOND_CUT, INITIALIZER, MODULES_CHANGED, Selector};
pub use state::{InstanceState, SelectorMap, Storage, storage_var};

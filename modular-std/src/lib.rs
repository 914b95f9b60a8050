//! # modular-std
//!
//! Standard modules for modular dispatch-registry contracts.
//!
//! This crate provides:
//! - **Registry**: [`ModuleRegistry`], the module serving `changeModules`
//! - **Authorization**: [`OwnershipGuard`]
//! - **Setup calls**: [`InitializerInvoker`]
//! - **Introspection**: [`ModuleIntrospection`] and the pure query functions
//! - **Testing**: ready-made modules in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use modular_core;

// Modules
pub mod guard;
pub mod initializer;
pub mod introspection;
pub mod registry;
pub mod testing;

pub use guard::OwnershipGuard;
pub use initializer::InitializerInvoker;
pub use introspection::ModuleIntrospection;
pub use registry::ModuleRegistry;

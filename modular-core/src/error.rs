//! Error types for modular contracts.
//!
//! - [`ModularError`] - Every failure an invocation can abort with
//! - [`CalldataError`] - Malformed argument payloads
//!
//! Any error aborts the enclosing invocation; the host discards every state
//! change made since its transactional boundary.

use crate::selector::{Address, Selector};
use thiserror::Error;

/// A boxed error type for module-defined failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the workspace.
pub type ModularResult<T> = Result<T, ModularError>;

/// Failure of an invocation.
#[derive(Error, Debug)]
pub enum ModularError {
    /// A mutation was attempted by someone other than the owner.
    #[error("caller {caller} is not the owner")]
    Unauthorized {
        /// The rejected principal.
        caller: Address,
    },

    /// ADD targeted a selector that is already mapped.
    #[error("selector {0} is already registered")]
    SelectorAlreadyRegistered(Selector),

    /// REPLACE, REMOVE or a lookup targeted an unmapped selector.
    #[error("selector {0} is not registered")]
    SelectorNotRegistered(Selector),

    /// A dispatched call named no registered operation.
    #[error("no operation registered for selector {0}")]
    NoSuchOperation(Selector),

    /// The batch initializer call failed; the batch was rolled back.
    #[error("initializer call failed: {0}")]
    InitializerFailed(#[source] Box<ModularError>),

    /// The selector is reserved and can never be mapped.
    #[error("selector {0} is reserved")]
    ReservedSelector(Selector),

    /// ADD or REPLACE pointed at the zero address.
    #[error("module address must not be zero (selector {0})")]
    InvalidModuleAddress(Selector),

    /// No module code is deployed at the address.
    #[error("no module deployed at {0}")]
    ModuleNotDeployed(Address),

    /// No instance is deployed at the address.
    #[error("no contract deployed at {0}")]
    ContractNotDeployed(Address),

    /// The module does not expose the requested entry point.
    #[error("module {module} has no entry point for selector {selector}")]
    EntryPointNotFound {
        /// Module that was called.
        module: Address,
        /// Entry point that was requested.
        selector: Selector,
    },

    /// Nested calls went deeper than the configured limit.
    #[error("call depth exceeded limit of {0}")]
    CallDepthExceeded(usize),

    /// The argument payload could not be decoded.
    #[error(transparent)]
    Calldata(#[from] CalldataError),

    /// A module-defined failure, relayed unchanged.
    #[error(transparent)]
    Custom(BoxError),
}

impl ModularError {
    /// Wrap a module-defined failure.
    pub fn custom(err: impl Into<BoxError>) -> Self {
        ModularError::Custom(err.into())
    }
}

impl From<BoxError> for ModularError {
    fn from(err: BoxError) -> Self {
        ModularError::Custom(err)
    }
}

/// Errors decoding a calldata payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalldataError {
    /// The payload ended before all expected values were read.
    #[error("calldata too short: expected at least {expected} values, got {actual}")]
    TooShort {
        /// Values required so far.
        expected: usize,
        /// Values available.
        actual: usize,
    },

    /// Values were left over after decoding.
    #[error("calldata has {0} unexpected trailing values")]
    Trailing(usize),

    /// A length prefix does not fit in memory.
    #[error("invalid length prefix {0}")]
    InvalidLength(String),

    /// An action code outside {0, 1, 2}.
    #[error("invalid module action code {0}")]
    InvalidAction(String),

    /// Initializer arguments were supplied without an initializer target.
    #[error("initializer arguments given without an initializer target")]
    OrphanInitializerArgs,
}

//! Change actions and the batch payload of `changeModules`.

use crate::{
    calldata::CalldataReader,
    error::CalldataError,
    felt::Felt,
    selector::{Address, Selector},
};
use std::fmt;

/// What a [`ChangeAction`] does to its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleAction {
    /// Map a selector that is currently absent.
    Add,
    /// Re-point a selector that is currently present.
    Replace,
    /// Unmap a selector that is currently present.
    Remove,
}

impl ModuleAction {
    /// Wire code of the action.
    pub const fn code(self) -> u64 {
        match self {
            ModuleAction::Add => 0,
            ModuleAction::Replace => 1,
            ModuleAction::Remove => 2,
        }
    }
}

impl TryFrom<Felt> for ModuleAction {
    type Error = CalldataError;

    fn try_from(value: Felt) -> Result<Self, Self::Error> {
        match value.to_u64() {
            Some(0) => Ok(ModuleAction::Add),
            Some(1) => Ok(ModuleAction::Replace),
            Some(2) => Ok(ModuleAction::Remove),
            _ => Err(CalldataError::InvalidAction(value.to_string())),
        }
    }
}

impl From<ModuleAction> for Felt {
    fn from(action: ModuleAction) -> Self {
        Felt::from_u64(action.code())
    }
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleAction::Add => "add",
            ModuleAction::Replace => "replace",
            ModuleAction::Remove => "remove",
        })
    }
}

/// One `(module address, action, selector)` triple of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeAction {
    /// Module backing the selector. Ignored for [`ModuleAction::Remove`].
    pub module: Address,
    /// What to do.
    pub action: ModuleAction,
    /// Selector being changed.
    pub selector: Selector,
}

impl ChangeAction {
    /// Map `selector` to `module`.
    pub fn add(module: Address, selector: Selector) -> Self {
        Self {
            module,
            action: ModuleAction::Add,
            selector,
        }
    }

    /// Re-point `selector` to `module`.
    pub fn replace(module: Address, selector: Selector) -> Self {
        Self {
            module,
            action: ModuleAction::Replace,
            selector,
        }
    }

    /// Unmap `selector`.
    pub fn remove(module: Address, selector: Selector) -> Self {
        Self {
            module,
            action: ModuleAction::Remove,
            selector,
        }
    }

    fn decode(reader: &mut CalldataReader<'_>) -> Result<Self, CalldataError> {
        let module = reader.address()?;
        let action = ModuleAction::try_from(reader.felt()?)?;
        let selector = reader.selector()?;
        Ok(Self {
            module,
            action,
            selector,
        })
    }

    fn encode_into(&self, out: &mut Vec<Felt>) {
        out.push(self.module.into());
        out.push(self.action.into());
        out.push(self.selector.into());
    }
}

/// Decode a length-prefixed list of actions.
pub fn decode_actions(reader: &mut CalldataReader<'_>) -> Result<Vec<ChangeAction>, CalldataError> {
    let len = reader.len_prefix()?;
    // Each action occupies three values.
    if len > reader.remaining() / 3 {
        return Err(CalldataError::TooShort {
            expected: len.saturating_mul(3),
            actual: reader.remaining(),
        });
    }
    (0..len).map(|_| ChangeAction::decode(reader)).collect()
}

/// Encode a length-prefixed list of actions.
pub fn encode_actions(actions: &[ChangeAction]) -> Vec<Felt> {
    let mut out = Vec::with_capacity(1 + actions.len() * 3);
    out.push(Felt::from(actions.len()));
    for action in actions {
        action.encode_into(&mut out);
    }
    out
}

/// The full argument payload of `changeModules`.
///
/// `initializer` is `None` when the payload carries the zero address, which
/// means "do not call an initializer". `Some((target, []))` calls `target`
/// with no arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeBatch {
    /// Actions, applied in order.
    pub actions: Vec<ChangeAction>,
    /// Optional initializer target and its arguments.
    pub initializer: Option<(Address, Vec<Felt>)>,
}

impl ChangeBatch {
    /// A batch with no initializer call.
    pub fn new(actions: Vec<ChangeAction>) -> Self {
        Self {
            actions,
            initializer: None,
        }
    }

    /// Call `target`'s initializer with `args` after the actions apply.
    pub fn with_initializer(mut self, target: Address, args: Vec<Felt>) -> Self {
        self.initializer = Some((target, args));
        self
    }

    /// Decode `[n, (addr, code, sel) × n, target, m, arg × m]`.
    pub fn decode(calldata: &[Felt]) -> Result<Self, CalldataError> {
        let mut reader = CalldataReader::new(calldata);
        let actions = decode_actions(&mut reader)?;
        let target = reader.address()?;
        let args = reader.array()?.to_vec();
        reader.finish()?;

        let initializer = if target.is_zero() {
            if !args.is_empty() {
                return Err(CalldataError::OrphanInitializerArgs);
            }
            None
        } else {
            Some((target, args))
        };
        Ok(Self {
            actions,
            initializer,
        })
    }

    /// Encode into the `changeModules` calldata layout.
    pub fn encode(&self) -> Vec<Felt> {
        let mut out = encode_actions(&self.actions);
        match &self.initializer {
            Some((target, args)) => {
                out.push((*target).into());
                out.push(Felt::from(args.len()));
                out.extend_from_slice(args);
            }
            None => {
                out.push(Felt::ZERO);
                out.push(Felt::ZERO);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felts(values: &[u64]) -> Vec<Felt> {
        values.iter().copied().map(Felt::from).collect()
    }

    #[test]
    fn test_decode_batch_without_initializer() {
        let sel = Selector::from_name("getReference");
        let mut calldata = vec![Felt::ONE, Felt::from(9u64), Felt::ZERO, sel.felt()];
        calldata.extend(felts(&[0, 0]));

        let batch = ChangeBatch::decode(&calldata).unwrap();
        assert_eq!(batch.actions, vec![ChangeAction::add(Address::from(9u64), sel)]);
        assert_eq!(batch.initializer, None);
        assert_eq!(batch.encode(), calldata);
    }

    #[test]
    fn test_decode_batch_with_initializer_and_no_args() {
        let calldata = felts(&[0, 9, 0]);
        let batch = ChangeBatch::decode(&calldata).unwrap();
        assert!(batch.actions.is_empty());
        assert_eq!(batch.initializer, Some((Address::from(9u64), Vec::new())));
    }

    #[test]
    fn test_decode_rejects_bad_action_code() {
        let calldata = felts(&[1, 9, 3, 77, 0, 0]);
        assert_eq!(
            ChangeBatch::decode(&calldata),
            Err(CalldataError::InvalidAction("0x3".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_orphan_initializer_args() {
        let calldata = felts(&[0, 0, 1, 100]);
        assert_eq!(
            ChangeBatch::decode(&calldata),
            Err(CalldataError::OrphanInitializerArgs)
        );
    }

    #[test]
    fn test_decode_rejects_oversized_action_count() {
        let calldata = felts(&[1000, 1, 0, 5]);
        assert!(matches!(
            ChangeBatch::decode(&calldata),
            Err(CalldataError::TooShort { .. })
        ));
    }
}

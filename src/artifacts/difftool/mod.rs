//! External diff tool orchestration
//!
//! Everything needed to turn a set of changed paths into a sequence of tool
//! launches: the tool catalog, working tree content conversion, staging of
//! blob contents into files, the per-file prompt and the shell invocation.

pub mod catalog;
pub mod error;
pub mod invoker;
pub mod materializer;
pub mod prompter;
pub mod smudge;

/// Three-valued switch for behavior that can be forced on or off from the
/// command line, falling back to configuration when neither flag is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    Enabled,
    Disabled,
    #[default]
    Unset,
}

impl TriState {
    /// Collapse a pair of opposing command-line switches into one state
    pub fn from_flags(enabled: bool, disabled: bool) -> Self {
        match (enabled, disabled) {
            (true, _) => TriState::Enabled,
            (_, true) => TriState::Disabled,
            _ => TriState::Unset,
        }
    }

    pub fn resolve(&self, default: bool) -> bool {
        match self {
            TriState::Enabled => true,
            TriState::Disabled => false,
            TriState::Unset => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, TriState::Unset)]
    #[case(true, false, TriState::Enabled)]
    #[case(false, true, TriState::Disabled)]
    fn test_tri_state_from_flags(
        #[case] enabled: bool,
        #[case] disabled: bool,
        #[case] expected: TriState,
    ) {
        assert_eq!(TriState::from_flags(enabled, disabled), expected);
    }

    #[rstest]
    #[case(TriState::Enabled, false, true)]
    #[case(TriState::Disabled, true, false)]
    #[case(TriState::Unset, true, true)]
    #[case(TriState::Unset, false, false)]
    fn test_tri_state_resolves_against_default(
        #[case] state: TriState,
        #[case] default: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(state.resolve(default), expected);
    }
}

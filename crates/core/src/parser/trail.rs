//! The state-trail stack used by error recovery.

use lattice_cfg_grammar::State;

/// Maximum tracked nesting depth of distinct states.
pub const TRAIL_CAPACITY: usize = 10;

/// Ordered history of distinct states entered since `INITIAL`.
///
/// A transition to a state already on the trail truncates back to that
/// state instead of growing, so the trail always lists a prefix of the
/// active nesting of grammar contexts (e.g. `INITIAL, MODE_OPEN,
/// MODE_BLOCK`). Recovery walks it top-down to find the nearest state that
/// admits an error token.
#[derive(Debug)]
pub struct StateTrail {
    states: Vec<State>,
}

impl StateTrail {
    /// A fresh trail containing only `INITIAL`.
    pub fn new() -> Self {
        let mut states = Vec::with_capacity(TRAIL_CAPACITY);
        states.push(State::Initial);
        Self { states }
    }

    /// Record a transition into `state`.
    pub fn record(&mut self, state: State) {
        if let Some(i) = self.states.iter().position(|&s| s == state) {
            self.states.truncate(i + 1);
            return;
        }
        assert!(
            self.states.len() < TRAIL_CAPACITY,
            "grammar bug: state trail full; grammar nests more than \
             {TRAIL_CAPACITY} distinct states"
        );
        self.states.push(state);
    }

    /// The recorded states, bottom (always `INITIAL`) first.
    pub fn states(&self) -> &[State] {
        &self.states
    }
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_initial() {
        let trail = StateTrail::new();
        assert_eq!(trail.states(), &[State::Initial]);
    }

    #[test]
    fn appends_new_states() {
        let mut trail = StateTrail::new();
        trail.record(State::Mode);
        trail.record(State::ModeOpen);
        trail.record(State::ModeBlock);
        assert_eq!(
            trail.states(),
            &[
                State::Initial,
                State::Mode,
                State::ModeOpen,
                State::ModeBlock
            ]
        );
    }

    #[test]
    fn revisiting_a_state_truncates() {
        let mut trail = StateTrail::new();
        trail.record(State::Mode);
        trail.record(State::ModeOpen);
        trail.record(State::ModeBlock);
        trail.record(State::ModeBlock);
        assert_eq!(trail.states().len(), 4);
        trail.record(State::Initial);
        assert_eq!(trail.states(), &[State::Initial]);
    }

    #[test]
    fn never_holds_duplicates() {
        let mut trail = StateTrail::new();
        for state in [
            State::Workspace,
            State::WorkspaceNumber,
            State::Initial,
            State::Binding,
            State::Bindcommand,
            State::Initial,
        ] {
            trail.record(state);
            let states = trail.states();
            for (i, a) in states.iter().enumerate() {
                assert!(!states[i + 1..].contains(a), "duplicate {a:?} in trail");
            }
        }
    }
}

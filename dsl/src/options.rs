//! Options that control a conversion run.

/// What to do when more than one wire drives the same input pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireConflictPolicy {
    /// The pin resolves to an unresolved marker. The conflict is reported.
    #[default]
    Reject,
    /// The last wire wins, matching exports that depend on the overwrite.
    /// The conflict is still reported.
    LastWins,
}

/// Options for converting networks into structured text.
#[derive(Clone, Debug)]
pub struct ConversionOptions {
    /// Text for one level of indentation in emitted code.
    pub indent: String,

    /// Handling of input pins driven by more than one wire.
    pub wire_conflicts: WireConflictPolicy,

    /// Text emitted where an expression could not be reconstructed. This
    /// must be a valid operand so the output still parses.
    pub unresolved_marker: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            indent: "   ".to_string(),
            wire_conflicts: WireConflictPolicy::default(),
            unresolved_marker: "\"__UNRESOLVED__\"".to_string(),
        }
    }
}

impl ConversionOptions {
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_wire_conflicts(mut self, policy: WireConflictPolicy) -> Self {
        self.wire_conflicts = policy;
        self
    }

    pub fn with_unresolved_marker(mut self, marker: impl Into<String>) -> Self {
        self.unresolved_marker = marker.into();
        self
    }
}

//! Provides definition for diagnostics, which are warnings associated with
//! converting a network.
//!
//! Conversion never stops because of a diagnostic. Each diagnostic records
//! where in the graph something could not be reconstructed so that a
//! reviewer can find it without reading the log.

use core::fmt;

use lad2scl_problems::Problem;

use crate::core::{NetworkId, PartId};

/// Where a diagnostic applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// A particular part in a network.
    Part { network: NetworkId, part: PartId },
    /// A file, for example a signature file.
    File(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Part { network, part } => write!(f, "network {} part {}", network, part),
            Location::File(path) => write!(f, "{}", path),
        }
    }
}

/// A label that refers to a location and a message related to that location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The position of label.
    pub location: Location,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn part(network: NetworkId, part: &PartId, message: impl Into<String>) -> Self {
        Self {
            location: Location::Part {
                network,
                part: part.clone(),
            },
            message: message.into(),
        }
    }

    pub fn file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Location::File(path.into()),
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostic have a code that is indicative of the category
/// and the location where it applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// Where the diagnostic applies.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    pub fn with_context(mut self, description: &str, item: &dyn fmt::Display) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    /// Returns true if the diagnostic was created from the problem.
    pub fn is(&self, problem: Problem) -> bool {
        self.code == problem.code()
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}: {}",
            self.code,
            self.primary.location,
            self.description(),
            self.primary.message
        )
    }
}

/// Collects diagnostics for one unit of work and reports each to the log
/// as it is added.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Moves diagnostics that were already reported into this sink.
    pub fn append(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_when_has_context_then_includes_context() {
        let diagnostic = Diagnostic::problem(
            Problem::UnresolvedReference,
            Label::part(NetworkId(2), &PartId::new("21"), "operand"),
        )
        .with_context("pin", &"operand");

        assert!(diagnostic.is(Problem::UnresolvedReference));
        assert!(diagnostic.description().ends_with("(pin=operand)"));
    }

    #[test]
    fn display_when_part_location_then_names_network_and_part() {
        let diagnostic = Diagnostic::problem(
            Problem::CycleDetected,
            Label::part(NetworkId(1), &PartId::new("7"), "while resolving in"),
        );

        let text = diagnostic.to_string();
        assert!(text.starts_with("P0002 network 1 part 7"));
    }
}

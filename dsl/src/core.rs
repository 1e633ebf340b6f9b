//! Identifiers shared by the graph model, the diagnostics and the records
//! produced from a network.
use core::fmt;

use serde::Deserialize;

/// Identifies a part (a non-leaf node) in one network graph.
///
/// Identifiers are only unique within the network that declares them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    pub fn new(id: impl Into<String>) -> Self {
        PartId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartId {
    fn from(value: &str) -> Self {
        PartId::new(value)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies an access (a variable or literal leaf) in one network graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct AccessId(String);

impl AccessId {
    pub fn new(id: impl Into<String>) -> Self {
        AccessId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccessId {
    fn from(value: &str) -> Self {
        AccessId::new(value)
    }
}

impl fmt::Display for AccessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a network within its block (1-based, as shown in the editor).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub usize);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named connection point on a part.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef {
    pub part: PartId,
    pub pin: String,
}

impl PinRef {
    pub fn new(part: impl Into<PartId>, pin: impl Into<String>) -> Self {
        PinRef {
            part: part.into(),
            pin: pin.into(),
        }
    }
}

impl From<&PartId> for PartId {
    fn from(value: &PartId) -> Self {
        value.clone()
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.part, self.pin)
    }
}

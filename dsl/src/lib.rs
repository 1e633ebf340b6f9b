//! Provides definitions of the objects that make up a LAD/FBD logic
//! network and the records produced when converting a network to
//! structured text.
//!
//! The crate also provides the signature registry of known blocks and a
//! loader-neutral JSON description of networks.
pub mod core;
pub mod diagnostic;
pub mod expr;
pub mod graph;
pub mod interchange;
pub mod kind;
pub mod operation;
pub mod options;
pub mod signature;

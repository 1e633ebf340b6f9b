//! Reconstructs expressions, effects and block calls from the graph of a
//! LAD/FBD network.
//!
//! The stages in [`stages`] are the entry points. A network is analyzed
//! into [`stages::NetworkLogic`], which the emitter turns into structured
//! text.
pub mod extractor;
pub mod fb_calls;
pub mod resolver;
pub mod stages;

#[cfg(test)]
mod analysis_property_tests;
#[cfg(test)]
mod test_helpers;

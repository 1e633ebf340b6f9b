//! Problem codes for diagnostics produced while converting networks.
//!
//! The enumeration is generated from `resources/problem-codes.csv` so that
//! codes stay stable between releases.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

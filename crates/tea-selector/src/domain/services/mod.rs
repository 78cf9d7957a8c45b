//! Domain Services
//!
//! Stateless-ish logic over catalog entities.

mod selection;

pub use selection::*;

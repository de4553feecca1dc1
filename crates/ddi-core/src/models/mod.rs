//! Domain models for the interaction checker.

mod drug;
mod interaction;
mod profile;

pub use drug::*;
pub use interaction::*;
pub use profile::*;

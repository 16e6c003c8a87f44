//! Domain models for the vetclinic core.

mod appointment;
mod identity;

pub use appointment::*;
pub use identity::*;

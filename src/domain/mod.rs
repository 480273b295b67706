//! Domain layer: pure types and logic, no I/O.

pub mod card;
pub mod payment;

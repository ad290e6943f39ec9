// Application layer: wires configuration into runnable scenarios.

pub mod suite;

pub use suite::{build_runner, Selection};

//! Test and demo harness utilities.
//!
//! Signal generators live here rather than under `#[cfg(test)]` so the CLI
//! demo and the integration tests under `tests/` share them.

pub mod signals;

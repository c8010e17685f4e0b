//! Generative task runner with bounded self-repair.
//!
//! This crate turns a free-text task description into a runnable Python
//! script. A generative model produces the code plus a dependency list, the
//! script is materialized as a self-contained unit in an isolated scratch
//! directory, executed in a child process, and re-synthesized with the
//! captured error when it fails, bounded by a repair limit. A separate
//! component serves read-only access to a configured data directory with
//! strict path confinement. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (manifest rendering, outcome
//!   classification, dependency vetting). No I/O, fully testable in
//!   isolation.
//! - **[`io`]**: Side-effecting operations (model gateway, scratch
//!   directories, process execution, confined file reads). Isolated to
//!   enable scripted doubles in tests.
//!
//! [`looping`] coordinates core logic with I/O to implement the
//! synthesize–execute–repair state machine.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

//! Stable exit codes for the CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: invalid input, rejected path, or an infrastructure error.
pub const INVALID: i32 = 1;
/// `taskforge run` spent the repair budget without a successful execution.
pub const EXHAUSTED: i32 = 2;
/// `taskforge read` found no file at a valid path.
pub const NOT_FOUND: i32 = 3;

//! Rendering of a runnable, self-contained script unit.
//!
//! A materialized unit is an inline metadata block (PEP 723) declaring the
//! minimum runtime version and the artifact's dependency list, followed by
//! the code body. `uv run` resolves the declared dependencies into an
//! ephemeral environment before executing the body.

use crate::core::types::GeneratedArtifact;

/// Minimum Python version declared in every materialized unit.
pub const REQUIRES_PYTHON: &str = ">=3.11";

/// Render the artifact as a single runnable text unit.
///
/// The dependency list is emitted verbatim: model order preserved, duplicates
/// preserved, nothing injected. Callers that want the list vetted must do so
/// on the artifact before rendering.
pub fn render_unit(artifact: &GeneratedArtifact) -> String {
    let mut buf = String::new();
    buf.push_str("# /// script\n");
    buf.push_str(&format!("# requires-python = \"{REQUIRES_PYTHON}\"\n"));
    buf.push_str("# dependencies = [\n");
    for dep in &artifact.dependencies {
        buf.push_str(&format!("#   \"{}\",\n", dep.module));
    }
    buf.push_str("# ]\n");
    buf.push_str("# ///\n");
    buf.push_str(&artifact.code);
    if !artifact.code.ends_with('\n') {
        buf.push('\n');
    }
    buf
}

//! Fixed-point normalization.
//!
//! Visits the root, then every element in document order, and asks the [`EditorOps`] hook to
//! repair it. After the first repair the scan restarts from the root, so rules always see a fresh
//! tree. The pass ends when a full scan changes nothing, or when the repair cap is reached.

use crate::commands::CommandError;
use crate::core::EditorCore;
use crate::ops::EditorOps;
use crate::path::Path;
use tracing::{trace, warn};

/// Outcome of a normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Number of repairs applied.
    pub repairs: usize,
    /// `true` if the pass stopped at the repair cap instead of a fixed point.
    pub capped: bool,
}

/// Run `ops.normalize_node` to a fixed point, applying at most `max_repairs` repairs.
pub fn normalize<O>(
    core: &mut EditorCore,
    ops: &O,
    max_repairs: usize,
) -> Result<NormalizeReport, CommandError>
where
    O: EditorOps + ?Sized,
{
    let mut repairs = 0;
    loop {
        if !repair_once(core, ops)? {
            return Ok(NormalizeReport {
                repairs,
                capped: false,
            });
        }
        repairs += 1;
        if repairs >= max_repairs {
            warn!(repairs, "normalization did not converge; stopping at the repair cap");
            return Ok(NormalizeReport {
                repairs,
                capped: true,
            });
        }
    }
}

/// Apply the first repair found in a root-first, top-down scan.
fn repair_once<O>(core: &mut EditorCore, ops: &O) -> Result<bool, CommandError>
where
    O: EditorOps + ?Sized,
{
    let root = Path::root();
    if ops.normalize_node(core, &root)? {
        trace!(path = %root, "normalized");
        return Ok(true);
    }
    for path in core.document().element_paths() {
        if ops.normalize_node(core, &path)? {
            trace!(path = %path, "normalized");
            return Ok(true);
        }
    }
    Ok(false)
}

//! Writing client-computed bounds back into the model tree.
//!
//! After the server sends a `requestBounds` action, the client renders the
//! model off-screen, measures every element, and answers with a
//! `computedBounds` action.  A [`ComputedBoundsApplicator`] copies those
//! measurements onto the server's copy of the tree so the layout engine works
//! with real text widths.
//!
//! [`CorrectedBoundsApplicator`] takes the reported positions and sizes
//! verbatim.  It never re-derives a position from the element's previous
//! bounds, which keeps coordinates in the client's frame when the diagram is
//! embedded inside another view.

use tracing::trace;

use super::index::SModelIndex;
use super::model::SModelRoot;
use crate::protocol::actions::ComputedBoundsAction;

/// Tally of what an [`ComputedBoundsApplicator::apply_bounds`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedBounds {
    /// Bounds entries written to a bounds-aware element.
    pub resized: usize,
    /// Alignment entries written to an alignable element.
    pub aligned: usize,
    /// Entries dropped because the id was unknown or the element lacked the
    /// capability.
    pub skipped: usize,
}

/// Applies a `computedBounds` result to a model tree.
pub trait ComputedBoundsApplicator: Send + Sync {
    /// Updates `root` in place from `action`.
    ///
    /// Unknown ids and elements without the matching capability are skipped
    /// silently; they show up only in the returned tally.
    fn apply_bounds(&self, root: &mut SModelRoot, action: &ComputedBoundsAction) -> AppliedBounds;
}

/// Applies new positions, sizes and alignments exactly as the client reports them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorrectedBoundsApplicator;

impl ComputedBoundsApplicator for CorrectedBoundsApplicator {
    fn apply_bounds(&self, root: &mut SModelRoot, action: &ComputedBoundsAction) -> AppliedBounds {
        let index = SModelIndex::new(root);
        let mut tally = AppliedBounds::default();

        for b in &action.bounds {
            match index.get_mut(root, &b.element_id) {
                Some(element) if element.kind().is_bounds_aware() => {
                    if let Some(p) = b.new_position {
                        element.position = Some(p);
                    }
                    if let Some(s) = b.new_size {
                        element.size = Some(s);
                    }
                    tally.resized += 1;
                }
                _ => {
                    trace!("skipping bounds for '{}'", b.element_id);
                    tally.skipped += 1;
                }
            }
        }

        for a in &action.alignments {
            match index.get_mut(root, &a.element_id) {
                Some(element) if element.kind().is_alignable() => {
                    element.alignment = Some(a.new_alignment);
                    tally.aligned += 1;
                }
                _ => {
                    trace!("skipping alignment for '{}'", a.element_id);
                    tally.skipped += 1;
                }
            }
        }

        tally
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

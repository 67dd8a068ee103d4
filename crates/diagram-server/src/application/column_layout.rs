//! A minimal layout engine that stacks top-level elements in one column.
//!
//! This is a stand-in for a real graph layout library: it does not route
//! edges or avoid overlaps inside nested elements.  It positions each
//! bounds-aware child of the root below the previous one and sizes the root
//! to fit.

use diagram_core::protocol::actions::Action;
use diagram_core::{Dimension, Point, SModelRoot};

use crate::domain::config::LayoutConfig;

use super::collaborators::LayoutEngine;

/// Places the root's bounds-aware children top to bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnLayoutEngine {
    config: LayoutConfig,
}

impl ColumnLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl LayoutEngine for ColumnLayoutEngine {
    fn layout(&self, root: &mut SModelRoot, _cause: Option<&Action>) {
        let LayoutConfig { padding, gap } = self.config;
        let mut y = padding;
        let mut widest: f64 = 0.0;
        let mut placed = 0usize;

        for child in root
            .children
            .iter_mut()
            .filter(|c| c.kind().is_bounds_aware())
        {
            let size = child.size.unwrap_or_default();
            child.position = Some(Point::new(padding, y));
            y += size.height + gap;
            widest = widest.max(size.width);
            placed += 1;
        }

        if placed > 0 && root.kind().is_bounds_aware() {
            // `y` overshoots by one trailing gap.
            let height = y - gap + padding;
            root.size = Some(Dimension::new(widest + 2.0 * padding, height));
        }
    }
}

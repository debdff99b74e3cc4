//! Scene synchronization cache.
//!
//! Mirrors the last scene the persistence service returned. The only way
//! to change it is [`SceneCache::apply_server_snapshot`], which replaces
//! the whole list; there is no local geometry editing here.

use crate::geometry;
use crate::shapes::{Shape, ShapeId};
use crate::wire;
use kurbo::Point;
use serde_json::Value;
use std::collections::HashSet;

/// Last-known authoritative shape list, in paint order.
#[derive(Debug, Clone, Default)]
pub struct SceneCache {
    shapes: Vec<Shape>,
    revision: u64,
}

impl SceneCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached scene with a server reply.
    ///
    /// Records that fail to decode are dropped. A record repeating an id
    /// already seen is dropped too, and only the first shape flagged
    /// selected keeps its flag.
    pub fn apply_server_snapshot(&mut self, records: &[Value]) {
        let mut seen: HashSet<ShapeId> = HashSet::new();
        let mut has_selection = false;

        let shapes: Vec<Shape> = wire::decode_scene(records)
            .into_iter()
            .filter(|shape| {
                let fresh = seen.insert(shape.id());
                if !fresh {
                    log::warn!("Dropping shape with duplicate id {}", shape.id());
                }
                fresh
            })
            .map(|mut shape| {
                if shape.is_selected() {
                    if has_selection {
                        log::warn!("Scene has more than one selected shape, clearing {}", shape.id());
                        shape.set_selected(false);
                    }
                    has_selection = true;
                }
                shape
            })
            .collect();

        self.revision += 1;
        log::debug!(
            "Scene revision {}: {} shapes ({} records)",
            self.revision,
            shapes.len(),
            records.len()
        );
        self.shapes = shapes;
    }

    /// Shapes in paint order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// The selected shape, if any.
    pub fn selected(&self) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.is_selected())
    }

    /// Get a shape by id.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of snapshots applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Topmost shape whose bounding box (grown by `tolerance`) holds `point`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<&Shape> {
        geometry::hit_test(point, &self.shapes, tolerance)
    }
}

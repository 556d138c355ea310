use std::collections::{HashMap, HashSet};

use super::model::{Icon, LayerId, LayerRef, PointLayer, PointRecord, VectorLayer};
use crate::error::ReorderError;

// ---------------------------------------------------------------------------
// LayerStore – ordered, partitioned collection of loaded layers
// ---------------------------------------------------------------------------

/// All layers currently loaded, kept as two tag partitions.
///
/// [`LayerStore::all_layers`] lists point layers before vector layers, each
/// partition in its own order, regardless of how additions were interleaved.
/// Layers are never removed.
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    points: Vec<PointLayer>,
    vectors: Vec<VectorLayer>,
    next_id: u64,
    point_layers_created: usize,
}

/// Owned layer, used while rebuilding the partitions.
enum Entry {
    Point(PointLayer),
    Vector(VectorLayer),
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a point layer named "CSV Layer N".  Empty layers are accepted.
    pub fn add_point_layer(&mut self, points: Vec<PointRecord>, icon: Icon) -> LayerId {
        let id = self.allocate_id();
        self.point_layers_created += 1;
        let name = format!("CSV Layer {}", self.point_layers_created);
        log::info!("Added point layer '{name}' ({} points, icon {icon})", points.len());
        self.points.push(PointLayer {
            id,
            name,
            points,
            icon,
        });
        id
    }

    /// Append a vector layer under the given name.
    pub fn add_vector_layer(&mut self, features: String, name: String) -> LayerId {
        let id = self.allocate_id();
        log::info!("Added vector layer '{name}'");
        self.vectors.push(VectorLayer { id, name, features });
        id
    }

    /// Point layers (in order) followed by vector layers (in order).
    pub fn all_layers(&self) -> Vec<LayerRef<'_>> {
        self.points
            .iter()
            .map(LayerRef::Point)
            .chain(self.vectors.iter().map(LayerRef::Vector))
            .collect()
    }

    pub fn point_layers(&self) -> &[PointLayer] {
        &self.points
    }

    pub fn vector_layers(&self) -> &[VectorLayer] {
        &self.vectors
    }

    pub fn get(&self, id: LayerId) -> Option<LayerRef<'_>> {
        self.all_layers().into_iter().find(|l| l.id() == id)
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the order of all layers with `order`, which must name every
    /// current layer exactly once.
    ///
    /// The partitions are rebuilt from each entry's kind in `order`.  On
    /// error the store is left untouched.
    pub fn reorder(&mut self, order: &[LayerId]) -> Result<(), ReorderError> {
        if order.len() != self.len() {
            return Err(ReorderError::LengthMismatch {
                expected: self.len(),
                got: order.len(),
            });
        }
        let known: HashSet<LayerId> = self.all_layers().iter().map(|l| l.id()).collect();
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !known.contains(id) {
                return Err(ReorderError::UnknownLayer(*id));
            }
            if !seen.insert(*id) {
                return Err(ReorderError::DuplicateLayer(*id));
            }
        }

        let mut by_id: HashMap<LayerId, Entry> = self
            .points
            .drain(..)
            .map(|l| (l.id, Entry::Point(l)))
            .chain(self.vectors.drain(..).map(|l| (l.id, Entry::Vector(l))))
            .collect();

        for id in order {
            match by_id.remove(id) {
                Some(Entry::Point(l)) => self.points.push(l),
                Some(Entry::Vector(l)) => self.vectors.push(l),
                None => unreachable!("order validated against the store"),
            }
        }
        log::debug!("Reordered {} layers", order.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// List editing helpers for the layer manager
// ---------------------------------------------------------------------------

/// Swap the item at `idx` with the one above it.  Returns the new index.
pub fn move_up<T>(items: &mut [T], idx: usize) -> Option<usize> {
    if idx == 0 || idx >= items.len() {
        return None;
    }
    items.swap(idx - 1, idx);
    Some(idx - 1)
}

/// Swap the item at `idx` with the one below it.  Returns the new index.
pub fn move_down<T>(items: &mut [T], idx: usize) -> Option<usize> {
    if idx + 1 >= items.len() {
        return None;
    }
    items.swap(idx, idx + 1);
    Some(idx + 1)
}

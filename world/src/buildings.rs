//! Building instance bookkeeping for the construction manager.

use std::collections::BTreeMap;

use forum_defence_core::{BuildingId, BuildingKind, CellCoord};

/// Snapshot of a building stored inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingRecord {
    /// Identifier allocated by the world for the building.
    pub id: BuildingId,
    /// Kind of building that was constructed.
    pub kind: BuildingKind,
    /// Upper-left cell of the footprint.
    pub origin: CellCoord,
}

impl BuildingRecord {
    /// Edge length of the footprint in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.kind.footprint()
    }

    /// Reports whether the footprint covers the provided cell.
    #[must_use]
    pub const fn covers(&self, cell: CellCoord) -> bool {
        let size = self.size();
        cell.x() >= self.origin.x()
            && cell.x() < self.origin.x() + size
            && cell.z() >= self.origin.z()
            && cell.z() < self.origin.z() + size
    }
}

/// Registry that stores building instances and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct BuildingRegistry {
    entries: BTreeMap<BuildingId, BuildingRecord>,
    next_building_id: BuildingId,
}

impl BuildingRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    /// Records a new building and returns the stored record.
    pub(crate) fn insert(&mut self, kind: BuildingKind, origin: CellCoord) -> BuildingRecord {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().saturating_add(1));
        let record = BuildingRecord { id, kind, origin };
        let _ = self.entries.insert(id, record);
        record
    }

    /// Locates the building whose footprint covers the provided cell.
    pub(crate) fn covering(&self, cell: CellCoord) -> Option<&BuildingRecord> {
        self.entries.values().find(|record| record.covers(cell))
    }

    pub(crate) fn remove(&mut self, id: BuildingId) -> Option<BuildingRecord> {
        self.entries.remove(&id)
    }

    /// Iterates over every building in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &BuildingRecord> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

//! Construction manager: placement and removal of buildings.

use forum_defence_core::{BuildingKind, CellCoord, PlacementError};
use tracing::debug;

use crate::{footprint_cells, BuildingRecord, World};

impl World {
    /// Checks a placement request without mutating anything.
    ///
    /// Every footprint cell must be inside the grid and empty, and at most one
    /// capital may stand at a time.
    pub fn validate_placement(
        &self,
        kind: BuildingKind,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        let size = kind.footprint();
        let grid_size = self.grid.size();
        let fits = origin
            .x()
            .checked_add(size)
            .zip(origin.z().checked_add(size))
            .is_some_and(|(end_x, end_z)| end_x <= grid_size && end_z <= grid_size);
        if !fits {
            return Err(PlacementError::OutOfBounds);
        }

        if !footprint_cells(origin, size).all(|cell| self.grid.is_vacant(cell)) {
            return Err(PlacementError::Occupied);
        }

        if kind == BuildingKind::Capital && self.capital.is_some() {
            return Err(PlacementError::DuplicateCapital);
        }

        Ok(())
    }

    /// Reports whether the footprint fits inside the grid on empty cells.
    #[must_use]
    pub fn can_place(&self, kind: BuildingKind, origin: CellCoord) -> bool {
        self.validate_placement(kind, origin).is_ok()
    }

    /// Places a building, deducting its cost from `funds`.
    ///
    /// On failure neither the grid nor `funds` change.
    pub fn place(
        &mut self,
        kind: BuildingKind,
        origin: CellCoord,
        funds: &mut u32,
    ) -> Result<BuildingRecord, PlacementError> {
        self.validate_placement(kind, origin).inspect_err(|reason| {
            debug!(?kind, ?origin, ?reason, "placement rejected");
        })?;

        let cost = kind.cost();
        if *funds < cost {
            debug!(?kind, ?origin, cost, funds = *funds, "placement unaffordable");
            return Err(PlacementError::InsufficientFunds);
        }
        *funds -= cost;

        let record = self.insert_building(kind, origin);
        if kind == BuildingKind::Capital {
            self.capital = Some(record);
        }
        Ok(record)
    }

    /// Removes the building whose footprint covers `cell`.
    ///
    /// Empty cells and the capital are left untouched and yield `None`.
    pub fn remove_at(&mut self, cell: CellCoord) -> Option<BuildingRecord> {
        let building = *self.buildings.covering(cell)?;
        if building.kind == BuildingKind::Capital {
            return None;
        }
        self.demolish(building);
        Some(building)
    }

    pub(crate) fn insert_building(
        &mut self,
        kind: BuildingKind,
        origin: CellCoord,
    ) -> BuildingRecord {
        let hit_points = kind.max_hit_points();
        for cell in footprint_cells(origin, kind.footprint()) {
            self.grid.occupy(cell, kind, hit_points);
        }
        if kind.is_connective() {
            self.connectivity.mark_dirty();
        }
        self.buildings.insert(kind, origin)
    }

    /// Clears every covered tile and forgets the record.
    pub(crate) fn demolish(&mut self, building: BuildingRecord) {
        for cell in footprint_cells(building.origin, building.size()) {
            self.grid.clear(cell);
        }
        let _ = self.buildings.remove(building.id);
        self.connectivity.mark_dirty();
    }
}

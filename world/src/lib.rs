#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Forum Defence.
//!
//! The [`World`] owns the tile grid, the building instance records and the
//! lazily recomputed road network. Every mutation that could break a grid
//! invariant (footprint overlap, partially cleared buildings, stale
//! connectivity) goes through the methods defined here, so the systems that
//! borrow the world never have to re-validate it.

mod buildings;
pub mod connectivity;
mod construction;
mod grid;

use forum_defence_core::{BuildingKind, CellCoord};
use tracing::warn;

pub use buildings::BuildingRecord;
pub use connectivity::{compute_reachable_roads, is_footprint_connected, RoadNetwork};
pub use grid::{footprint_cells, perimeter_cells, Grid, Tile};

use buildings::BuildingRegistry;
use connectivity::Connectivity;

/// Result of an invader hit against a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The building survived the hit.
    Damaged {
        /// Building that was hit.
        building: BuildingRecord,
        /// Hit points left on every covered tile.
        hit_points: u32,
    },
    /// The building was destroyed and its tiles cleared.
    Destroyed(BuildingRecord),
    /// The capital was destroyed; the session is over.
    CapitalDestroyed(BuildingRecord),
}

/// Represents the authoritative Forum Defence grid state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    buildings: BuildingRegistry,
    connectivity: Connectivity,
    capital: Option<BuildingRecord>,
}

impl World {
    /// Creates a grid of `size` cells per side holding only the capital.
    ///
    /// The capital is anchored at `(size / 2 - 1, size / 2 - 1)`; grids too
    /// small to hold its footprint start without one.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let mut world = Self {
            grid: Grid::new(size),
            buildings: BuildingRegistry::new(),
            connectivity: Connectivity::new(),
            capital: None,
        };

        let footprint = BuildingKind::Capital.footprint();
        if size >= footprint {
            let anchor = (size / 2).saturating_sub(1).min(size - footprint);
            let capital =
                world.insert_building(BuildingKind::Capital, CellCoord::new(anchor, anchor));
            world.capital = Some(capital);
        }

        world
    }

    /// Rebuilds a world from persisted row-major tiles.
    ///
    /// Building records are recovered by claiming footprints in row-major
    /// order. Returns `None` when the tiles cannot be partitioned into whole
    /// footprints, which marks the snapshot as corrupt.
    #[must_use]
    pub fn from_tiles(size: u32, tiles: Vec<Tile>) -> Option<Self> {
        let grid = Grid::from_tiles(size, tiles)?;
        let mut world = Self {
            grid: Grid::new(size),
            buildings: BuildingRegistry::new(),
            connectivity: Connectivity::new(),
            capital: None,
        };
        let mut claimed = vec![false; grid.tiles().len()];

        for (cell, tile) in grid.iter() {
            let Some(kind) = tile.kind() else {
                continue;
            };
            if claimed[index_of(cell, size)] {
                continue;
            }

            let footprint = kind.footprint();
            for covered in footprint_cells(cell, footprint) {
                let whole = grid.tile(covered).is_some_and(|other| other.holds(kind));
                if !whole || claimed[index_of(covered, size)] {
                    warn!(?cell, ?kind, "snapshot holds a partial building footprint");
                    return None;
                }
                claimed[index_of(covered, size)] = true;
            }

            let record = world.buildings.insert(kind, cell);
            if kind == BuildingKind::Capital && world.capital.is_none() {
                world.capital = Some(record);
            }
        }

        world.grid = grid;
        Some(world)
    }

    /// Read-only access to the tile grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the tile grid for service delivery and aging.
    ///
    /// Building occupancy cannot be changed through this handle.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Record of the standing capital, if any.
    #[must_use]
    pub fn capital(&self) -> Option<&BuildingRecord> {
        self.capital.as_ref()
    }

    /// Cells covered by the standing capital; empty once it has fallen.
    #[must_use]
    pub fn capital_cells(&self) -> Vec<CellCoord> {
        self.capital
            .map(|capital| footprint_cells(capital.origin, capital.size()).collect())
            .unwrap_or_default()
    }

    /// Iterates over every building in placement order.
    pub fn buildings(&self) -> impl Iterator<Item = &BuildingRecord> {
        self.buildings.iter()
    }

    /// Number of buildings standing, the capital included.
    #[must_use]
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// Building whose footprint covers the provided cell.
    #[must_use]
    pub fn building_at(&self, cell: CellCoord) -> Option<&BuildingRecord> {
        self.buildings.covering(cell)
    }

    /// Forces the road network to be recomputed at the next refresh.
    pub fn mark_connectivity_dirty(&mut self) {
        self.connectivity.mark_dirty();
    }

    /// Reports whether the road network awaits recomputation.
    #[must_use]
    pub fn connectivity_dirty(&self) -> bool {
        self.connectivity.is_dirty()
    }

    /// Recomputes the road network from the capital when it is dirty.
    ///
    /// Returns `true` when a recomputation actually ran.
    pub fn refresh_connectivity(&mut self) -> bool {
        let roots = self.capital_cells();
        self.connectivity.refresh(&self.grid, &roots)
    }

    /// Road network computed by the latest refresh.
    #[must_use]
    pub fn road_network(&self) -> &RoadNetwork {
        self.connectivity.network()
    }

    /// Reports whether the building touches the road network of the latest refresh.
    #[must_use]
    pub fn is_connected(&self, building: &BuildingRecord) -> bool {
        is_footprint_connected(
            &self.grid,
            building.origin,
            building.size(),
            self.connectivity.network(),
        )
    }

    /// Applies invader damage to the building covering `cell`.
    ///
    /// Every tile of a multi-cell building shares one hit-point pool. Returns
    /// `None` when no building covers the cell.
    pub fn damage_at(&mut self, cell: CellCoord, amount: u32) -> Option<DamageOutcome> {
        let building = *self.buildings.covering(cell)?;
        let current = self.grid.tile(cell).map_or(0, Tile::hit_points);
        let remaining = current.saturating_sub(amount);

        if remaining > 0 {
            for covered in footprint_cells(building.origin, building.size()) {
                self.grid.set_hit_points(covered, remaining);
            }
            return Some(DamageOutcome::Damaged {
                building,
                hit_points: remaining,
            });
        }

        self.demolish(building);
        if building.kind == BuildingKind::Capital {
            warn!(origin = ?building.origin, "capital destroyed");
            self.capital = None;
            Some(DamageOutcome::CapitalDestroyed(building))
        } else {
            Some(DamageOutcome::Destroyed(building))
        }
    }
}

fn index_of(cell: CellCoord, size: u32) -> usize {
    let index = u64::from(cell.z()) * u64::from(size) + u64::from(cell.x());
    usize::try_from(index).unwrap_or(usize::MAX)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use forum_defence_core::{BuildingKind, CellCoord, Service};

    use super::{Tile, World};

    /// Tile at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<Tile> {
        world.grid.tile(cell).copied()
    }

    /// Copies every tile in row-major order for serialisation.
    #[must_use]
    pub fn grid_snapshot(world: &World) -> Vec<Tile> {
        world.grid.tiles().to_vec()
    }

    /// Reports whether the building covering `cell` touches the road network.
    ///
    /// Roads and empty cells report `false`.
    #[must_use]
    pub fn is_building_connected(world: &World, cell: CellCoord) -> bool {
        world
            .building_at(cell)
            .filter(|building| !building.kind.is_connective())
            .is_some_and(|building| world.is_connected(building))
    }

    /// Number of houses currently receiving both water and food.
    #[must_use]
    pub fn fully_serviced_houses(world: &World) -> u32 {
        let count = world
            .grid
            .iter()
            .filter(|(_, tile)| tile.holds(BuildingKind::House) && tile.is_fully_serviced())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Reports whether the house at `cell` currently receives the service.
    #[must_use]
    pub fn house_has_service(world: &World, cell: CellCoord, service: Service) -> bool {
        world
            .grid
            .tile(cell)
            .is_some_and(|tile| tile.holds(BuildingKind::House) && tile.has_service(service))
    }
}

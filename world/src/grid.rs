//! Dense tile storage backing the authoritative world.

use forum_defence_core::{BuildingKind, CellCoord, Service};
use serde::{Deserialize, Serialize};

/// State of a single grid cell.
///
/// A tile records which building covers it, the hit points of that building,
/// and two service countdowns that keep a house supplied while positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: Option<BuildingKind>,
    hit_points: u32,
    water_ticks: u32,
    food_ticks: u32,
}

impl Tile {
    /// Building kind covering the tile, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<BuildingKind> {
        self.kind
    }

    /// Hit points of the covering building; zero for empty tiles.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Reports whether no building covers the tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
    }

    /// Reports whether the tile belongs to the road/plaza network.
    #[must_use]
    pub fn is_connective(&self) -> bool {
        self.kind.is_some_and(BuildingKind::is_connective)
    }

    /// Reports whether the tile holds a building of the provided kind.
    #[must_use]
    pub fn holds(&self, kind: BuildingKind) -> bool {
        self.kind == Some(kind)
    }

    /// Ticks left on the provided service countdown.
    #[must_use]
    pub const fn service_ticks(&self, service: Service) -> u32 {
        match service {
            Service::Water => self.water_ticks,
            Service::Food => self.food_ticks,
        }
    }

    /// Reports whether the provided service is currently active.
    #[must_use]
    pub const fn has_service(&self, service: Service) -> bool {
        self.service_ticks(service) > 0
    }

    /// Reports whether both water and food are currently supplied.
    #[must_use]
    pub const fn is_fully_serviced(&self) -> bool {
        self.has_service(Service::Water) && self.has_service(Service::Food)
    }

    fn occupy(&mut self, kind: BuildingKind, hit_points: u32) {
        self.kind = Some(kind);
        self.hit_points = hit_points;
    }

    fn clear(&mut self) {
        *self = Tile::default();
    }
}

/// Fixed square array of tiles addressed by [`CellCoord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates an empty grid with `size` cells per side.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            size,
            tiles: vec![Tile::default(); capacity],
        }
    }

    /// Rebuilds a grid from row-major tiles; `None` when the count mismatches.
    #[must_use]
    pub fn from_tiles(size: u32, tiles: Vec<Tile>) -> Option<Self> {
        let expected = usize::try_from(u64::from(size) * u64::from(size)).ok()?;
        (tiles.len() == expected).then_some(Self { size, tiles })
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.size && cell.z() < self.size
    }

    /// Tile at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Row-major tiles, suitable for serialisation.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Iterates over every cell together with its tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Tile)> + '_ {
        let size = self.size.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % size, index / size), tile)
        })
    }

    /// Reports whether the cell is in bounds and holds no building.
    #[must_use]
    pub fn is_vacant(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(Tile::is_empty)
    }

    /// Reports whether the cell is in bounds and part of the road/plaza network.
    #[must_use]
    pub fn is_connective(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(Tile::is_connective)
    }

    /// Restarts a service countdown on the tile; ignored outside the grid.
    pub fn refresh_service(&mut self, cell: CellCoord, service: Service, ticks: u32) {
        if let Some(tile) = self.tile_mut(cell) {
            match service {
                Service::Water => tile.water_ticks = ticks,
                Service::Food => tile.food_ticks = ticks,
            }
        }
    }

    /// Decrements every positive service countdown by one tick.
    pub fn age_services(&mut self) {
        for tile in &mut self.tiles {
            tile.water_ticks = tile.water_ticks.saturating_sub(1);
            tile.food_ticks = tile.food_ticks.saturating_sub(1);
        }
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, kind: BuildingKind, hit_points: u32) {
        if let Some(tile) = self.tile_mut(cell) {
            tile.occupy(kind, hit_points);
        }
    }

    pub(crate) fn set_hit_points(&mut self, cell: CellCoord, hit_points: u32) {
        if let Some(tile) = self.tile_mut(cell) {
            tile.hit_points = hit_points;
        }
    }

    pub(crate) fn clear(&mut self, cell: CellCoord) {
        if let Some(tile) = self.tile_mut(cell) {
            tile.clear();
        }
    }

    fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|index| self.tiles.get_mut(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.z()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }
}

/// Cells covered by a square footprint anchored at `origin`.
pub fn footprint_cells(origin: CellCoord, size: u32) -> impl Iterator<Item = CellCoord> {
    (0..size).flat_map(move |dz| {
        (0..size).map(move |dx| CellCoord::new(origin.x() + dx, origin.z() + dz))
    })
}

/// Cells strictly 4-adjacent to a square footprint, in row-major order.
///
/// Cells outside a grid of `grid_size` cells per side are skipped.
pub fn perimeter_cells(origin: CellCoord, size: u32, grid_size: u32) -> Vec<CellCoord> {
    let x0 = i64::from(origin.x());
    let z0 = i64::from(origin.z());
    let extent = i64::from(size);
    let mut cells = Vec::with_capacity(usize::try_from(size * 4).unwrap_or(0));

    for z in (z0 - 1)..=(z0 + extent) {
        for x in (x0 - 1)..=(x0 + extent) {
            let inside_x = x >= x0 && x < x0 + extent;
            let inside_z = z >= z0 && z < z0 + extent;
            let adjacent = (inside_x && !inside_z) ^ (inside_z && !inside_x);
            if !adjacent {
                continue;
            }
            let (Ok(x), Ok(z)) = (u32::try_from(x), u32::try_from(z)) else {
                continue;
            };
            if x < grid_size && z < grid_size {
                cells.push(CellCoord::new(x, z));
            }
        }
    }

    cells
}

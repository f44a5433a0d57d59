use forum_defence_core::{BuildingKind, CellCoord};
use forum_defence_world::{footprint_cells, query, World};

fn assert_footprints_are_disjoint(world: &World) {
    let mut covered = 0;
    for building in world.buildings() {
        for cell in footprint_cells(building.origin, building.size()) {
            let tile = world.grid().tile(cell).expect("footprint inside grid");
            assert!(tile.holds(building.kind), "{cell:?} lost its {:?}", building.kind);
            assert!(tile.hit_points() > 0);
            assert_eq!(tile.hit_points(), building.kind.max_hit_points());
            covered += 1;
        }
    }
    let occupied = world.grid().iter().filter(|(_, tile)| !tile.is_empty()).count();
    assert_eq!(occupied, covered, "footprints overlap or leaked tiles");
}

#[test]
fn placement_sequences_never_overlap() {
    for size in [4, 8, 13] {
        let mut world = World::new(size);
        let mut funds = u32::MAX;
        let mut kinds = BuildingKind::ALL.iter().copied().cycle();

        for z in 0..size + 1 {
            for x in (0..size + 1).step_by(2) {
                let kind = kinds.next().expect("cycle never ends");
                let _ = world.place(kind, CellCoord::new(x, z), &mut funds);
                assert_footprints_are_disjoint(&world);
            }
        }

        let removals: Vec<_> = world
            .buildings()
            .filter(|building| building.kind != BuildingKind::Capital)
            .step_by(3)
            .map(|building| building.origin)
            .collect();
        for origin in removals {
            assert!(world.remove_at(origin).is_some());
            assert_footprints_are_disjoint(&world);
        }
    }
}

#[test]
fn severing_the_only_road_disconnects_the_producer() {
    let mut world = World::new(8);
    let mut funds = 1_000;
    for x in [0, 1, 2] {
        let _ = world
            .place(BuildingKind::Road, CellCoord::new(x, 3), &mut funds)
            .expect("road");
    }
    let _ = world
        .place(BuildingKind::Well, CellCoord::new(0, 2), &mut funds)
        .expect("well");
    let _ = world.refresh_connectivity();
    assert!(query::is_building_connected(&world, CellCoord::new(0, 2)));

    let _ = world.remove_at(CellCoord::new(1, 3)).expect("middle road");
    assert!(world.connectivity_dirty());
    let _ = world.refresh_connectivity();

    assert!(!query::is_building_connected(&world, CellCoord::new(0, 2)));
    assert!(world.road_network().contains(CellCoord::new(2, 3)));
    assert!(!world.road_network().contains(CellCoord::new(0, 3)));
}

#[test]
fn removing_an_empty_cell_changes_nothing() {
    let mut world = World::new(8);
    let before = query::grid_snapshot(&world);

    for _ in 0..3 {
        assert!(world.remove_at(CellCoord::new(7, 7)).is_none());
    }

    assert_eq!(query::grid_snapshot(&world), before);
}

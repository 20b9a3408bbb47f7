use shopfloor_core::{CellCoord, Grid, GridBuilder, Path};
use shopfloor_system_pathfinding::find_path;

#[test]
fn open_five_by_five_crossing_takes_eight_steps() {
    let grid = Grid::open(5, 5).expect("grid");
    let start = CellCoord::new(0, 0);
    let goal = CellCoord::new(4, 4);

    let path = find_path(start, goal, &grid);

    assert_eq!(path.len(), 8);
    assert_eq!(path.destination(), Some(goal));
    assert_route_is_contiguous(start, &path, &grid);

    let mut remaining = start.manhattan_distance(goal);
    for cell in path.iter() {
        let distance = cell.manhattan_distance(goal);
        assert_eq!(distance + 1, remaining, "every step must close in on the goal");
        remaining = distance;
    }
}

#[test]
fn bordered_room_paths_match_manhattan_distance() {
    let grid = bordered_room(9, 7);
    let interior: Vec<CellCoord> = grid.cells().filter(|cell| grid.is_walkable(*cell)).collect();

    for &start in interior.iter().step_by(3) {
        for &goal in interior.iter().step_by(5) {
            let path = find_path(start, goal, &grid);
            let expected = start.manhattan_distance(goal);
            assert_eq!(
                u32::try_from(path.len()).expect("small grid"),
                expected,
                "suboptimal route from {start:?} to {goal:?}"
            );
            if start != goal {
                assert_route_is_contiguous(start, &path, &grid);
            }
        }
    }
}

#[test]
fn enclosed_goal_is_unreachable() {
    let grid = GridBuilder::from_ascii(&[
        ".......", //
        "..###..", //
        "..#.#..", //
        "..###..", //
        ".......",
    ])
    .expect("plan")
    .build();

    let path = find_path(CellCoord::new(0, 0), CellCoord::new(3, 2), &grid);
    assert!(path.is_empty());

    let escape = find_path(CellCoord::new(3, 2), CellCoord::new(0, 0), &grid);
    assert!(escape.is_empty(), "enclosed start must not escape either");
}

#[test]
fn invalid_goals_produce_empty_paths() {
    let grid = GridBuilder::from_ascii(&["..#", "..."]).expect("plan").build();
    let start = CellCoord::new(0, 0);

    assert!(find_path(start, CellCoord::new(10, 0), &grid).is_empty());
    assert!(find_path(start, CellCoord::new(2, 0), &grid).is_empty());
    assert!(find_path(start, start, &grid).is_empty());
    assert!(find_path(CellCoord::new(30, 30), CellCoord::new(1, 1), &grid).is_empty());
}

#[test]
fn route_detours_around_walls() {
    let grid = GridBuilder::from_ascii(&[
        ".....", //
        ".###.", //
        ".#...", //
        ".#.#.", //
        "...#.",
    ])
    .expect("plan")
    .build();
    let start = CellCoord::new(2, 2);
    let goal = CellCoord::new(0, 0);

    let path = find_path(start, goal, &grid);

    assert_route_is_contiguous(start, &path, &grid);
    assert_eq!(path.destination(), Some(goal));
    assert_eq!(path.len(), 8);
}

#[test]
fn search_is_deterministic() {
    let grid = bordered_room(12, 12);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(10, 10);

    let first: Vec<_> = find_path(start, goal, &grid).iter().collect();
    let second: Vec<_> = find_path(start, goal, &grid).iter().collect();
    assert_eq!(first, second);
}

fn bordered_room(columns: u32, rows: u32) -> Grid {
    let mut builder = GridBuilder::new(columns, rows).expect("builder");
    for column in 0..columns {
        builder.wall(CellCoord::new(column, 0)).expect("top");
        builder.wall(CellCoord::new(column, rows - 1)).expect("bottom");
    }
    for row in 0..rows {
        builder.wall(CellCoord::new(0, row)).expect("left");
        builder.wall(CellCoord::new(columns - 1, row)).expect("right");
    }
    builder.build()
}

fn assert_route_is_contiguous(start: CellCoord, path: &Path, grid: &Grid) {
    let mut previous = start;
    for cell in path.iter() {
        assert!(grid.is_walkable(cell), "route crosses wall at {cell:?}");
        assert_eq!(previous.manhattan_distance(cell), 1, "route jumps at {cell:?}");
        previous = cell;
    }
}

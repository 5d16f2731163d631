//! A* over a level's tile grid, four-connected.

use crate::map::MapNode;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

type Cell = (i32, i32);

#[derive(Clone, Copy, PartialEq, Eq)]
struct Frontier {
    cell: Cell,
    /// Cost so far plus heuristic
    priority: i32,
}

// Min-heap on priority
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cells a walker may stand on. Holes and the stair back up count as
/// impassable unless they are the goal.
fn passable(map: &MapNode, cell: Cell, goal: Cell) -> bool {
    if cell.0 < 0 || cell.1 < 0 {
        return false;
    }
    match map.tile(cell.0 as usize, cell.1 as usize) {
        Some(tile) => !tile.blocking && (!(tile.is_hole || tile.is_stair_up) || cell == goal),
        None => false,
    }
}

/// Shortest path from `start` to `goal`, excluding `start`.
/// `None` if the goal cannot be reached.
pub fn find_path(map: &MapNode, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    if !passable(map, goal, goal) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut cost: HashMap<Cell, i32> = HashMap::new();

    cost.insert(start, 0);
    open.push(Frontier {
        cell: start,
        priority: manhattan(start, goal),
    });

    while let Some(Frontier { cell, .. }) = open.pop() {
        if cell == goal {
            return Some(walk_back(&came_from, cell));
        }
        let here = cost.get(&cell).copied().unwrap_or(i32::MAX);

        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let next = (cell.0 + dx, cell.1 + dy);
            if !passable(map, next, goal) {
                continue;
            }
            let tentative = here + 1;
            if tentative < cost.get(&next).copied().unwrap_or(i32::MAX) {
                came_from.insert(next, cell);
                cost.insert(next, tentative);
                open.push(Frontier {
                    cell: next,
                    priority: tentative + manhattan(next, goal),
                });
            }
        }
    }
    None
}

fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

fn walk_back(came_from: &HashMap<Cell, Cell>, mut cell: Cell) -> Vec<Cell> {
    let mut path = vec![cell];
    while let Some(&prev) = came_from.get(&cell) {
        path.push(prev);
        cell = prev;
    }
    path.pop();
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::constants::*;
    use crate::enemy::AiParams;

    fn corridor_map() -> MapNode {
        // Floor ring inside walls with a wall splitting the middle
        let n = 9;
        let matrix = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| {
                        let border = x == 0 || y == 0 || x == n - 1 || y == n - 1;
                        let divider = x == 4 && y < 6;
                        if border || divider {
                            CODE_WALL_FRONT
                        } else {
                            CODE_FLOOR_MIN
                        }
                    })
                    .collect()
            })
            .collect();
        MapNode::from_matrix(
            0,
            0,
            matrix,
            TILE_SIZE,
            AssetCatalog::with_defaults().tile_textures(),
            AiParams::from_tiles(5.0, 1.1, 1.0, TILE_SIZE),
        )
        .unwrap()
    }

    #[test]
    fn test_path_goes_around_wall() {
        let map = corridor_map();
        let path = find_path(&map, (2, 2), (6, 2)).unwrap();
        assert_eq!(path.last(), Some(&(6, 2)));
        assert!(path.iter().all(|&(x, y)| !(x == 4 && y < 6)));
        // Down to row 6, across, back up
        assert_eq!(path.len(), 4 + 4 + 4);
    }

    #[test]
    fn test_unreachable_goal() {
        let map = corridor_map();
        assert!(find_path(&map, (2, 2), (4, 2)).is_none());
        assert!(find_path(&map, (2, 2), (40, 2)).is_none());
    }

    #[test]
    fn test_holes_avoided_unless_goal() {
        let mut map = corridor_map();
        map.set_code(2, 3, CODE_HOLE).unwrap();
        let path = find_path(&map, (2, 2), (2, 4)).unwrap();
        assert!(!path.contains(&(2, 3)));
        assert_eq!(find_path(&map, (2, 2), (2, 3)), Some(vec![(2, 3)]));
    }

    #[test]
    fn test_up_stair_avoided_unless_goal() {
        let mut map = corridor_map();
        map.set_code(2, 3, CODE_STAIR_UP).unwrap();
        let path = find_path(&map, (2, 2), (2, 4)).unwrap();
        assert!(!path.contains(&(2, 3)));
        assert_eq!(find_path(&map, (2, 2), (2, 3)), Some(vec![(2, 3)]));
    }

    #[test]
    fn test_start_equals_goal() {
        let map = corridor_map();
        assert_eq!(find_path(&map, (2, 2), (2, 2)), Some(vec![]));
    }
}

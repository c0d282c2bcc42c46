//! Rasterizing a turtle walk into a road/building plot grid.

use glam::IVec2;

use crate::turtle::TurtlePath;

/// World units between adjacent plot grid cells.
pub const PLOT_SPACING: f32 = 10.0;

/// Highest building tier; cells adjoining more roads than this stay empty.
const MAX_BUILDING_VALUE: u8 = 4;

/// Occupancy grid derived from a turtle path: walked cells become roads.
#[derive(Clone, Debug)]
pub struct PlotGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl PlotGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell carries a road.
    pub fn is_road(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x] == 1
    }

    fn road_value(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }
}

/// A single placed city piece, in plot-grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CityPlacement {
    pub grid_pos: IVec2,
    pub piece: CityPiece,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CityPiece {
    Road,
    /// Building tier, 1..=4, from the count of adjoining road cells.
    Building(u8),
}

/// Rasterize the walked plot points into a padded grid.
///
/// The grid covers the path extents with a two-cell offset and a few cells
/// of margin so neighbor sums near the boundary stay in range.
pub fn rasterize(path: &TurtlePath) -> PlotGrid {
    let min_abs = IVec2::new(path.min.x.abs() as i32, path.min.y.abs() as i32);
    let width = (path.max.x as i32 + min_abs.x) as usize + 5;
    let height = (path.max.y as i32 + min_abs.y) as usize + 5;

    let mut cells = vec![0u8; width * height];
    for plot in &path.plots {
        let x = (min_abs.x + plot.x as i32) as usize + 2;
        let y = (min_abs.y + plot.y as i32) as usize + 2;
        cells[y * width + x] = 1;
    }

    PlotGrid {
        width,
        height,
        cells,
    }
}

/// Evaluate the grid into placements: roads on walked cells, buildings on
/// empty cells adjoining 1..=`max_tier` roads (the count picks the tier).
pub fn evaluate_grid(grid: &PlotGrid, max_tier: u8) -> Vec<CityPlacement> {
    let max_tier = max_tier.min(MAX_BUILDING_VALUE);
    let mut placements = Vec::new();

    for y in 1..grid.height.saturating_sub(1) {
        for x in 1..grid.width.saturating_sub(1) {
            if grid.is_road(x, y) {
                placements.push(CityPlacement {
                    grid_pos: IVec2::new(x as i32, y as i32),
                    piece: CityPiece::Road,
                });
                continue;
            }

            let value = grid.road_value(x - 1, y)
                + grid.road_value(x + 1, y)
                + grid.road_value(x, y - 1)
                + grid.road_value(x, y + 1);
            if value != 0 && value <= max_tier {
                placements.push(CityPlacement {
                    grid_pos: IVec2::new(x as i32, y as i32),
                    piece: CityPiece::Building(value),
                });
            }
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{RuleTable, derive};
    use crate::turtle::interpret;

    fn city_path() -> TurtlePath {
        let mut rules = RuleTable::new();
        rules.add_rule('A', "AB[<BA");
        rules.add_rule('B', "AA>AB]<");
        interpret(&derive("A", &rules, 2)).unwrap()
    }

    #[test]
    fn test_rasterize_marks_every_plot_as_road() {
        let path = city_path();
        let grid = rasterize(&path);
        let road_count = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.is_road(x, y))
            .count();
        assert_eq!(road_count, path.plots.len());
    }

    #[test]
    fn test_grid_pads_extents() {
        let path = interpret("AAA").unwrap();
        let grid = rasterize(&path);
        assert!(grid.width() >= 5);
        assert!(grid.height() >= path.plots.len() + 4);
    }

    #[test]
    fn test_buildings_line_the_roads() {
        let path = interpret("AAAA").unwrap();
        let grid = rasterize(&path);
        let placements = evaluate_grid(&grid, 4);

        let roads: Vec<_> = placements
            .iter()
            .filter(|p| p.piece == CityPiece::Road)
            .collect();
        let buildings: Vec<_> = placements
            .iter()
            .filter(|p| matches!(p.piece, CityPiece::Building(_)))
            .collect();
        assert_eq!(roads.len(), 4);
        assert!(!buildings.is_empty());

        // Every building touches at least one road cell.
        for b in &buildings {
            let IVec2 { x, y } = b.grid_pos;
            let touches = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
                .iter()
                .any(|&(nx, ny)| grid.is_road(nx as usize, ny as usize));
            assert!(touches, "building at {:?} not adjacent to a road", b.grid_pos);
        }
    }

    #[test]
    fn test_building_tier_counts_adjacent_roads() {
        // A straight road of 3 cells: the cell beside the middle road has
        // exactly one adjacent road.
        let path = interpret("AAA").unwrap();
        let grid = rasterize(&path);
        let placements = evaluate_grid(&grid, 4);
        for p in &placements {
            if let CityPiece::Building(tier) = p.piece {
                assert!((1..=4).contains(&tier));
            }
        }
    }

    #[test]
    fn test_max_tier_filters_dense_cells() {
        let path = city_path();
        let grid = rasterize(&path);
        let capped = evaluate_grid(&grid, 1);
        for p in capped {
            if let CityPiece::Building(tier) = p.piece {
                assert_eq!(tier, 1);
            }
        }
    }

    #[test]
    fn test_city_layout_is_deterministic() {
        let grid_a = rasterize(&city_path());
        let grid_b = rasterize(&city_path());
        assert_eq!(evaluate_grid(&grid_a, 4), evaluate_grid(&grid_b, 4));
    }
}

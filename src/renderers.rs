//! Raster output of a maze using the grid's cell and wall pixel geometry.
//!
//! Every cell is a `cell_pixels` square, separated from its neighbours and from the image border by
//! `wall_pixels` of wall. A carved passage paints over the wall between the two cells.

use fnv::FnvHashSet;
use image::{Rgb, RgbImage};

use crate::cells::CompassPrimary;
use crate::grid::Grid;
use crate::session::Route;
use crate::units::{ColumnsCount, RowsCount};

pub const WALL: Rgb<u8> = Rgb([0, 0, 0]);
pub const UNVISITED: Rgb<u8> = Rgb([0x40, 0x40, 0x40]);
pub const VISITED: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
pub const SEARCHED: Rgb<u8> = Rgb([0x87, 0xce, 0xfa]);
pub const PATH: Rgb<u8> = Rgb([0xff, 0xd7, 0x00]);
pub const HIGHLIGHT: Rgb<u8> = Rgb([0xff, 0x00, 0xff]);
pub const START: Rgb<u8> = Rgb([0x00, 0xc0, 0x00]);
pub const END: Rgb<u8> = Rgb([0xe0, 0x00, 0x00]);

/// What to draw on top of the bare maze.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    route: Option<Route>,
    path: FnvHashSet<usize>,
    highlighted: FnvHashSet<usize>,
    show_searched: bool,
}

#[derive(Debug, Default)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    pub fn route(mut self, route: Route) -> RenderOptionsBuilder {
        self.options.route = Some(route);
        self
    }

    pub fn path(mut self, path: &[usize]) -> RenderOptionsBuilder {
        self.options.path = path.iter().cloned().collect();
        self
    }

    /// Cells touched by the latest builder or solver step.
    pub fn highlight(mut self, cells: &[usize]) -> RenderOptionsBuilder {
        self.options.highlighted = cells.iter().cloned().collect();
        self
    }

    pub fn show_searched(mut self, show: bool) -> RenderOptionsBuilder {
        self.options.show_searched = show;
        self
    }

    pub fn build(self) -> RenderOptions {
        self.options
    }
}

impl RenderOptions {
    fn cell_colour(&self, grid: &Grid, cell: usize) -> Rgb<u8> {
        if let Some(route) = self.route {
            if cell == route.start {
                return START;
            }
            if cell == route.end {
                return END;
            }
        }
        if self.path.contains(&cell) {
            PATH
        } else if self.highlighted.contains(&cell) {
            HIGHLIGHT
        } else if self.show_searched && grid.is_searched(cell) {
            SEARCHED
        } else if grid.is_visited(cell) {
            VISITED
        } else {
            UNVISITED
        }
    }

    fn passage_colour(&self, grid: &Grid, a: usize, b: usize) -> Rgb<u8> {
        let on_path = |cell| {
            self.path.contains(&cell) || self.route.map_or(false, |r| cell == r.start || cell == r.end)
        };
        if on_path(a) && on_path(b) {
            PATH
        } else if self.show_searched && grid.is_searched(a) && grid.is_searched(b) {
            SEARCHED
        } else {
            VISITED
        }
    }
}

/// Pixel size of the whole image for `grid`.
pub fn image_dimensions(grid: &Grid) -> (u32, u32) {
    let geometry = grid.geometry();
    let ColumnsCount(columns) = grid.columns();
    let RowsCount(rows) = grid.rows();
    let pitch = geometry.pitch();
    let wall = geometry.wall_pixels.0;
    ((columns * pitch + wall) as u32, (rows * pitch + wall) as u32)
}

pub fn render_png(grid: &Grid, options: &RenderOptions) -> RgbImage {
    let (width, height) = image_dimensions(grid);
    let mut img = RgbImage::from_pixel(width, height, WALL);

    let geometry = grid.geometry();
    let cell_pixels = geometry.cell_pixels.0 as u32;
    let wall_pixels = geometry.wall_pixels.0 as u32;
    let pitch = geometry.pitch() as u32;

    for cell in 0..grid.size() {
        let coord = match grid.coordinate(cell) {
            Some(coord) => coord,
            None => continue,
        };
        let x = wall_pixels + coord.column as u32 * pitch;
        let y = wall_pixels + coord.row as u32 * pitch;
        fill_rect(&mut img, x, y, cell_pixels, cell_pixels, options.cell_colour(grid, cell));

        // each passage is painted once, from its west or north end
        if let Some(east) = grid.neighbour_at_direction(cell, CompassPrimary::East)
            .filter(|_| grid.is_open(cell, CompassPrimary::East)) {
            let colour = options.passage_colour(grid, cell, east);
            fill_rect(&mut img, x + cell_pixels, y, wall_pixels, cell_pixels, colour);
        }
        if let Some(south) = grid.neighbour_at_direction(cell, CompassPrimary::South)
            .filter(|_| grid.is_open(cell, CompassPrimary::South)) {
            let colour = options.passage_colour(grid, cell, south);
            fill_rect(&mut img, x, y + cell_pixels, cell_pixels, wall_pixels, colour);
        }
    }
    img
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, colour: Rgb<u8>) {
    let x_end = (x + width).min(img.width());
    let y_end = (y + height).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, colour);
        }
    }
}

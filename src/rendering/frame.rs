//! Resolves a camera position into the tiles and offsets needed to draw it.
//!
//! Canvas coordinates have their origin at the top-left corner of the canvas,
//! x to the right and y downwards, exactly like a 2D drawing surface.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::{MAX_TILE_ZOOM, MIN_FRAME_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point, TileCoord, ViewPoint};
use crate::core::projection::{forward_mercator, inverse_mercator, world_size};

/// Which canvas edge a ray from the center leaves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Top,
    Right,
    Bottom,
    Left,
}

/// Where the ray from the canvas center towards a coordinate crosses the border
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderPosition {
    pub x: f64,
    pub y: f64,
    pub border: Border,
    /// Angle of the ray in radians, `atan2(dy, dx)` with y pointing down
    pub direction: f64,
}

/// Crossing point of a ray leaving the canvas center at `direction` with the
/// canvas border pulled in by `inset` pixels on every side.
///
/// The exit edge is picked from the corner angle `a = atan2(h, w)` of the inset
/// rectangle: right for `-a < dir <= a`, top for `-pi + a < dir <= -a`,
/// bottom for `a < dir <= pi - a` and left otherwise. A ray through a corner
/// therefore belongs to the next edge clockwise from the right one.
pub fn border_intersection(canvas_size: Point, inset: f64, direction: f64) -> BorderPosition {
    let center = canvas_size.multiply(0.5);
    let half_w = center.x - inset;
    let half_h = center.y - inset;
    let aspect_dir = half_h.atan2(half_w);
    let (cos, sin) = (direction.cos(), direction.sin());

    let (border, x, y) = if -aspect_dir < direction && direction <= aspect_dir {
        (Border::Right, center.x + half_w, center.y + half_w * sin / cos)
    } else if -PI + aspect_dir < direction && direction <= -aspect_dir {
        (Border::Top, center.x - half_h * cos / sin, center.y - half_h)
    } else if aspect_dir < direction && direction <= PI - aspect_dir {
        (Border::Bottom, center.x + half_h * cos / sin, center.y + half_h)
    } else {
        (Border::Left, center.x - half_w, center.y - half_w * sin / cos)
    };

    BorderPosition { x, y, border, direction }
}

/// Everything needed to draw one instant of a transition.
///
/// Tiles are listed row by row from the north-west. Their `x`/`y` are not
/// wrapped or clamped: drawing tile `t` at `((t.x + translation.x) * scale,
/// (t.y + translation.y) * scale)` places it correctly even past the
/// antimeridian, and the tile cache resolves the canonical tile to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    tiles: Vec<TileCoord>,
    offset: Point,
    translation: Point,
    canvas_size: Point,
    scale: f64,
    zoom: f64,
    tile_zoom: u8,
}

impl Frame {
    /// Resolves `view` on a canvas of `canvas_size` pixels.
    ///
    /// Tiles come from the integer zoom nearest to `view.zoom` (at least 0, at
    /// most [`MAX_TILE_ZOOM`]) and are stretched by `scale`. Every tile touching
    /// `[0, w] x [0, h]` is included, edges inclusive. Latitudes beyond the
    /// Mercator square are not validated.
    ///
    /// Zooms below [`MIN_FRAME_ZOOM`] (and a NaN zoom) are resolved at
    /// [`MIN_FRAME_ZOOM`], which bounds the tile count by the canvas area.
    pub fn calculate(canvas_size: Point, view: &ViewPoint) -> Frame {
        let zoom = view.zoom.max(MIN_FRAME_ZOOM);
        let offset = forward_mercator(&view.coord(), zoom);
        let tile_zoom = zoom.round().clamp(0.0, MAX_TILE_ZOOM as f64);
        let scale = TILE_SIZE * 2_f64.powf(zoom - tile_zoom);

        // North-west corner of the world on the canvas
        let origin = canvas_size.multiply(0.5).subtract(&offset);
        let (x0, x1) = tile_span(origin.x, canvas_size.x, scale);
        let (y0, y1) = tile_span(origin.y, canvas_size.y, scale);

        let z = tile_zoom as u8;
        let tiles = (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y, z)))
            .collect();

        Frame {
            tiles,
            offset,
            translation: origin.multiply(1.0 / scale),
            canvas_size,
            scale,
            zoom,
            tile_zoom: z,
        }
    }

    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// World-pixel position of the canvas center, longitude not wrapped
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Position of tile `(0, 0)` on the canvas, in tile units
    pub fn translation(&self) -> Point {
        self.translation
    }

    pub fn canvas_size(&self) -> Point {
        self.canvas_size
    }

    /// Drawn size of one tile in pixels
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn tile_zoom(&self) -> u8 {
        self.tile_zoom
    }

    /// Canvas position of a tile's top-left corner
    pub fn tile_position(&self, tile: &TileCoord) -> Point {
        Point::new(
            (tile.x as f64 + self.translation.x) * self.scale,
            (tile.y as f64 + self.translation.y) * self.scale,
        )
    }

    /// Canvas position of `coord`.
    ///
    /// A coordinate more than half a world away horizontally from the canvas
    /// center is shifted by one world width towards it, so points near the
    /// antimeridian stay next to a frame that straddles it.
    pub fn project(&self, coord: &LatLng) -> Point {
        let mut world = forward_mercator(coord, self.zoom);
        let width = world_size(self.zoom);
        let dx = world.x - self.offset.x;
        if dx.abs() > width / 2.0 {
            world.x -= width * dx.signum();
        }
        world
            .subtract(&self.offset)
            .add(&self.canvas_size.multiply(0.5))
    }

    /// Camera position under a canvas point, at this frame's zoom.
    /// Longitude is wrapped to [-180, 180].
    pub fn unproject(&self, point: &Point) -> ViewPoint {
        let world = point
            .subtract(&self.canvas_size.multiply(0.5))
            .add(&self.offset);
        inverse_mercator(&world, self.zoom)
            .wrapped()
            .with_zoom(self.zoom)
    }

    pub fn is_coordinate_visible(&self, coord: &LatLng) -> bool {
        self.is_coordinate_visible_within(coord, 0.0)
    }

    /// Whether `coord` lands in `[inset, size - inset)` on both canvas axes
    pub fn is_coordinate_visible_within(&self, coord: &LatLng, inset: f64) -> bool {
        let p = self.project(coord);
        p.x >= inset
            && p.x < self.canvas_size.x - inset
            && p.y >= inset
            && p.y < self.canvas_size.y - inset
    }

    pub fn border_position(&self, coord: &LatLng) -> BorderPosition {
        self.border_position_within(coord, 0.0)
    }

    /// Where the ray from the canvas center through `coord` meets the border
    /// inset by `inset` pixels. Meaningful for coordinates outside that area.
    pub fn border_position_within(&self, coord: &LatLng, inset: f64) -> BorderPosition {
        let p = self.project(coord);
        let center = self.canvas_size.multiply(0.5);
        let direction = (p.y - center.y).atan2(p.x - center.x);
        border_intersection(self.canvas_size, inset, direction)
    }
}

/// First and last tile index touching `[0, extent]` when tile 0 starts at `origin`
fn tile_span(origin: f64, extent: f64, scale: f64) -> (i64, i64) {
    (
        (-origin / scale).floor() as i64,
        ((extent - origin) / scale).floor() as i64,
    )
}

use crate::location::{quantize, PointKey, Position, KEY_RESOLUTION};

/// Puzzle-specific rules deciding when two positions denote the same point.
///
/// [`Planar`] and [`Wraparound`] are built-in implementations.
/// A [`GridTopology`](crate::GridTopology) keeps its rules for its whole lifetime, so implementations must be
/// cheap to clone and safe to share between threads.
pub trait Wrap: Clone + Send + Sync {
    /// Map `position` into the canonical coordinate space.
    fn normalize(&self, position: Position) -> Position;

    /// Express `position` as the representative closest to `anchor`.
    ///
    /// Paths and merged lines use this so that a walk across a seam keeps moving in the caller's coordinate space
    /// instead of jumping back to the canonical one.
    fn normalize_near(&self, position: Position, _anchor: Position) -> Position {
        self.normalize(position)
    }

    /// The interning key of `position`. Must agree with [`normalize`](Wrap::normalize).
    fn key(&self, position: Position) -> PointKey {
        PointKey::quantize(self.normalize(position))
    }
}

/// A flat grid with no wraparound. Positions are their own canonical form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Planar;

impl Wrap for Planar {
    fn normalize(&self, position: Position) -> Position {
        position
    }
}

/// A grid whose rows and/or columns wrap around, e.g. a cylinder or a torus.
///
/// A period of [`None`] leaves that axis flat.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Wraparound {
    rows: Option<usize>,
    columns: Option<usize>,
}

impl Wraparound {
    /// Both axes wrap.
    pub fn torus(rows: usize, columns: usize) -> Self {
        Self { rows: Some(rows), columns: Some(columns) }
    }

    /// Only the horizontal axis wraps; leaving the right edge re-enters on the left.
    pub fn horizontal(columns: usize) -> Self {
        Self { rows: None, columns: Some(columns) }
    }

    /// Only the vertical axis wraps.
    pub fn vertical(rows: usize) -> Self {
        Self { rows: Some(rows), columns: None }
    }
}

fn wrap_coord(coord: f64, period: Option<usize>) -> f64 {
    match period {
        Some(period) if period > 0 => coord.rem_euclid(period as f64),
        _ => coord,
    }
}

fn wrap_near(coord: f64, anchor: f64, period: Option<usize>) -> f64 {
    match period {
        Some(period) if period > 0 => {
            let period = period as f64;
            let delta = coord - anchor;
            anchor + delta - period * (delta / period).round()
        }
        _ => coord,
    }
}

fn wrap_key(coord: f64, period: Option<usize>) -> i64 {
    match period {
        // quantize before wrapping so that values a hair below the seam land on zero
        Some(period) if period > 0 => quantize(coord).rem_euclid(quantize(period as f64)),
        _ => quantize(coord),
    }
}

impl Wrap for Wraparound {
    fn normalize(&self, position: Position) -> Position {
        let normalized = Position::new(wrap_coord(position.top, self.rows), wrap_coord(position.left, self.columns));
        // rem_euclid may round up to the period itself for tiny negative inputs
        Position::new(
            snap_to_zero(normalized.top, self.rows),
            snap_to_zero(normalized.left, self.columns),
        )
    }

    fn normalize_near(&self, position: Position, anchor: Position) -> Position {
        Position::new(
            wrap_near(position.top, anchor.top, self.rows),
            wrap_near(position.left, anchor.left, self.columns),
        )
    }

    fn key(&self, position: Position) -> PointKey {
        PointKey {
            top: wrap_key(position.top, self.rows),
            left: wrap_key(position.left, self.columns),
        }
    }
}

fn snap_to_zero(coord: f64, period: Option<usize>) -> f64 {
    match period {
        Some(period) if (coord - period as f64).abs() < KEY_RESOLUTION => 0.0,
        _ => coord,
    }
}

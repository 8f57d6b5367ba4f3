//! Fog of war: a persistent, monotonically revealed visibility mask
//!
//! The world is covered by a grid of cells holding reveal intensity in
//! [0, 1]. Reveal circles only ever raise a cell (`max`), so explored terrain
//! never fogs over again and repeating a reveal changes nothing.
//!
//! Row 0 is the bottom of the world (y-up). The 8-bit mask texture is
//! rebuilt row by row, only where cells changed since the previous render.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PersistError};
use crate::smoothstep;

/// Upper bound on grid cells (4096 x 4096)
pub const MAX_GRID_CELLS: usize = 4096 * 4096;

/// A queued reveal request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealCircle {
    pub center: Vec2,
    pub radius: f32,
}

/// 8-bit single-channel mask sampled by the fog compositor
#[derive(Debug, Clone, PartialEq)]
pub struct MaskTexture {
    width: usize,
    height: usize,
    texels: Vec<u8>,
    /// Bumped whenever texels change, so uploads can be skipped
    version: u64,
}

impl MaskTexture {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            texels: vec![0; width * height],
            version: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn texel(&self, col: usize, row: usize) -> u8 {
        self.texels[row * self.width + col]
    }
}

/// Serializable copy of the mask: flat array plus world and grid dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSnapshot {
    pub world_width: f32,
    pub world_height: f32,
    pub cols: usize,
    pub rows: usize,
    pub mask: Vec<f32>,
}

/// Quantize an intensity to a texel byte
#[inline]
fn to_texel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Reveal intensity at `distance` from a circle's center
///
/// Cells inside `radius - softness` are fully revealed; the band out to
/// `radius` is blended for an anti-aliased edge.
pub fn reveal_intensity(distance: f32, radius: f32, softness: f32) -> f32 {
    if softness <= 0.0 {
        return if distance <= radius { 1.0 } else { 0.0 };
    }
    let inner = (radius - softness).max(0.0);
    1.0 - smoothstep(inner, radius, distance)
}

#[derive(Debug, Clone)]
pub struct FogOfWar {
    world_size: Vec2,
    cell_size: f32,
    edge_softness: f32,
    cols: usize,
    rows: usize,
    mask: Vec<f32>,
    /// Elapsed time, feeds shader effects only
    accum: f32,
    pending: Vec<RevealCircle>,
    /// Inclusive row span touched since the last render
    dirty_rows: Option<(usize, usize)>,
    texture: MaskTexture,
}

impl FogOfWar {
    /// Create a fully fogged mask covering a `width` x `height` world
    pub fn new(
        width: f32,
        height: f32,
        cell_size: f32,
        edge_softness: f32,
    ) -> Result<Self, ConfigError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWorldSize { width, height });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        if !edge_softness.is_finite() || edge_softness < 0.0 {
            return Err(ConfigError::InvalidEdgeSoftness(edge_softness));
        }

        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        if cols.saturating_mul(rows) > MAX_GRID_CELLS {
            return Err(ConfigError::GridTooLarge { cols, rows });
        }

        Ok(Self {
            world_size: Vec2::new(width, height),
            cell_size,
            edge_softness,
            cols,
            rows,
            mask: vec![0.0; cols * rows],
            accum: 0.0,
            pending: Vec::new(),
            dirty_rows: None,
            texture: MaskTexture::new(cols, rows),
        })
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn edge_softness(&self) -> f32 {
        self.edge_softness
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn accum(&self) -> f32 {
        self.accum
    }

    pub fn pending(&self) -> &[RevealCircle] {
        &self.pending
    }

    /// Raw intensities, row-major
    pub fn mask(&self) -> &[f32] {
        &self.mask
    }

    /// Queue a reveal of every cell within `radius` of `(x, y)`
    ///
    /// Non-positive radii, non-finite input and circles that miss the world
    /// entirely are ignored. Circles hanging over the edge are clipped.
    pub fn add_fog_circle(&mut self, x: f32, y: f32, radius: f32) {
        if !(x.is_finite() && y.is_finite() && radius.is_finite()) || radius <= 0.0 {
            return;
        }
        let center = Vec2::new(x, y);
        let nearest = center.clamp(Vec2::ZERO, self.world_size);
        if nearest.distance_squared(center) > radius * radius {
            return;
        }
        self.pending.push(RevealCircle { center, radius });
    }

    /// Advance the effect clock and apply queued reveals
    pub fn update(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.accum += dt;
        }
        self.apply_pending();
    }

    /// Current mask texture, refreshed for any rows revealed since last call
    ///
    /// Queued reveals are applied first, so the texture always shows the
    /// union of every reveal made so far.
    pub fn render(&mut self) -> &MaskTexture {
        self.apply_pending();
        if let Some((first, last)) = self.dirty_rows.take() {
            for row in first..=last {
                let start = row * self.cols;
                let end = start + self.cols;
                for (texel, &value) in self.texture.texels[start..end]
                    .iter_mut()
                    .zip(&self.mask[start..end])
                {
                    *texel = to_texel(value);
                }
            }
            self.texture.version += 1;
        }
        &self.texture
    }

    /// Intensity of the cell under a world point (0 outside the world)
    pub fn intensity_at(&self, x: f32, y: f32) -> f32 {
        match self.cell_at(x, y) {
            Some((col, row)) => self.mask[row * self.cols + col],
            None => 0.0,
        }
    }

    pub fn is_revealed(&self, x: f32, y: f32) -> bool {
        self.intensity_at(x, y) > 0.0
    }

    pub fn cell_value(&self, col: usize, row: usize) -> f32 {
        self.mask[row * self.cols + col]
    }

    /// Number of cells with any reveal at all
    pub fn revealed_cells(&self) -> usize {
        self.mask.iter().filter(|&&v| v > 0.0).count()
    }

    /// Mean intensity over the whole world, 0 (all fog) to 1 (all explored)
    pub fn revealed_fraction(&self) -> f32 {
        let total: f32 = self.mask.iter().sum();
        total / self.mask.len() as f32
    }

    pub fn snapshot(&self) -> FogSnapshot {
        FogSnapshot {
            world_width: self.world_size.x,
            world_height: self.world_size.y,
            cols: self.cols,
            rows: self.rows,
            mask: self.mask.clone(),
        }
    }

    /// Merge a saved mask into this one
    ///
    /// Cells take the larger of the current and stored value, so restoring
    /// can never hide terrain that is already explored.
    pub fn restore(&mut self, snapshot: &FogSnapshot) -> Result<(), PersistError> {
        if (snapshot.cols, snapshot.rows) != (self.cols, self.rows) {
            return Err(PersistError::GridMismatch {
                expected: (self.cols, self.rows),
                found: (snapshot.cols, snapshot.rows),
            });
        }
        let found = Vec2::new(snapshot.world_width, snapshot.world_height);
        if !found.abs_diff_eq(self.world_size, 0.5) {
            return Err(PersistError::WorldMismatch {
                expected: (self.world_size.x, self.world_size.y),
                found: (found.x, found.y),
            });
        }
        if snapshot.mask.len() != self.mask.len() {
            return Err(PersistError::MaskLength {
                expected: self.mask.len(),
                found: snapshot.mask.len(),
            });
        }
        if let Some((index, &value)) = snapshot
            .mask
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(PersistError::MaskValue { index, value });
        }

        for (cell, &stored) in self.mask.iter_mut().zip(&snapshot.mask) {
            *cell = cell.max(stored);
        }
        self.dirty_rows = Some((0, self.rows - 1));
        Ok(())
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !(x >= 0.0 && y >= 0.0 && x < self.world_size.x && y < self.world_size.y) {
            return None;
        }
        let col = ((x / self.cell_size) as usize).min(self.cols - 1);
        let row = ((y / self.cell_size) as usize).min(self.rows - 1);
        Some((col, row))
    }

    /// Clamped cell index span covering `[lo, hi]` along one axis
    fn span(&self, lo: f32, hi: f32, cells: usize) -> (usize, usize) {
        let max = cells as i64 - 1;
        let first = ((lo / self.cell_size).floor() as i64).clamp(0, max) as usize;
        let last = ((hi / self.cell_size).floor() as i64).clamp(0, max) as usize;
        (first, last)
    }

    fn apply_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for circle in &pending {
            self.reveal(circle);
        }
        // Hand the allocation back for next frame's requests
        self.pending = pending;
        self.pending.clear();
    }

    fn reveal(&mut self, circle: &RevealCircle) {
        let RevealCircle { center, radius } = *circle;
        let (col0, col1) = self.span(center.x - radius, center.x + radius, self.cols);
        let (row0, row1) = self.span(center.y - radius, center.y + radius, self.rows);

        let mut touched: Option<(usize, usize)> = None;
        for row in row0..=row1 {
            let cy = (row as f32 + 0.5) * self.cell_size;
            let mut row_changed = false;
            for col in col0..=col1 {
                let cx = (col as f32 + 0.5) * self.cell_size;
                let d = Vec2::new(cx, cy).distance(center);
                let value = reveal_intensity(d, radius, self.edge_softness);
                let cell = &mut self.mask[row * self.cols + col];
                if value > *cell {
                    *cell = value;
                    row_changed = true;
                }
            }
            if row_changed {
                touched = Some(match touched {
                    Some((first, _)) => (first, row),
                    None => (row, row),
                });
            }
        }

        if let Some((first, last)) = touched {
            self.dirty_rows = Some(match self.dirty_rows {
                Some((a, b)) => (a.min(first), b.max(last)),
                None => (first, last),
            });
        }
    }
}

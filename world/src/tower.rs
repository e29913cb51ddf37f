//! Runtime tower geometry built from a validated level description.

use std::collections::BTreeSet;

use glam::Vec2;
use tower_platformer_core::{Aabb, CellCoord, ColumnSpan};

use crate::{level::LevelDescription, tuning::Tuning};

/// Tile grid of the tower together with the coins that remain uncollected.
///
/// The geometry never changes after construction. Coins are the only mutable
/// part and can only be removed through the world's command surface.
#[derive(Clone, Debug)]
pub struct Tower {
    columns: u32,
    rows: u32,
    column_width: f32,
    row_height: f32,
    surface_band: f32,
    cells: Vec<TowerRow>,
}

#[derive(Clone, Debug, Default)]
struct TowerRow {
    ground: Vec<ColumnSpan>,
    ladders: Vec<ColumnSpan>,
    coins: BTreeSet<u32>,
}

impl Tower {
    /// Builds the runtime tower for a validated level.
    #[must_use]
    pub fn from_level(level: &LevelDescription, tuning: &Tuning) -> Self {
        let cells = level
            .layout
            .iter()
            .map(|row| TowerRow {
                ground: row.ground.clone(),
                ladders: row.ladders.clone(),
                coins: row
                    .coins
                    .iter()
                    .copied()
                    .filter(|column| *column < level.columns)
                    .collect(),
            })
            .collect();

        Self {
            columns: level.columns,
            rows: level.rows,
            column_width: tuning.column_width(),
            row_height: tuning.row_height(),
            surface_band: tuning.surface_band(),
            cells,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of a single column in world units.
    #[must_use]
    pub const fn column_width(&self) -> f32 {
        self.column_width
    }

    /// Height of a single row in world units.
    #[must_use]
    pub const fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Thickness of the landing band at the top of each row.
    #[must_use]
    pub const fn surface_band(&self) -> f32 {
        self.surface_band
    }

    /// Total width of the tower in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.column_width
    }

    /// Total height of the tower in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.row_height
    }

    /// Width and height of the tower in world units.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Reports whether the tile supports standing.
    #[must_use]
    pub fn is_ground(&self, cell: CellCoord) -> bool {
        self.row(cell.row())
            .map_or(false, |row| covers(&row.ground, cell.column()))
    }

    /// Reports whether the tile is climbable. Ground tiles are never ladders.
    #[must_use]
    pub fn is_ladder(&self, cell: CellCoord) -> bool {
        !self.is_ground(cell)
            && self
                .row(cell.row())
                .map_or(false, |row| covers(&row.ladders, cell.column()))
    }

    /// Reports whether the tile is the topmost rung of a ladder column.
    #[must_use]
    pub fn is_ladder_top(&self, cell: CellCoord) -> bool {
        if !self.is_ladder(cell) {
            return false;
        }
        match cell.row().checked_sub(1) {
            Some(above) => !self.is_ladder(CellCoord::new(cell.column(), above)),
            None => true,
        }
    }

    /// Reports whether an uncollected coin sits in the tile.
    #[must_use]
    pub fn has_coin(&self, cell: CellCoord) -> bool {
        self.row(cell.row())
            .map_or(false, |row| row.coins.contains(&cell.column()))
    }

    /// Number of coins still present in the tower.
    #[must_use]
    pub fn coin_count(&self) -> usize {
        self.cells.iter().map(|row| row.coins.len()).sum()
    }

    /// Tiles holding uncollected coins in row-major order.
    pub fn coins(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).zip(self.cells.iter()).flat_map(|(row, cells)| {
            cells
                .coins
                .iter()
                .map(move |column| CellCoord::new(*column, row))
        })
    }

    /// Pickup area of a coin: a row-height square centred in its column,
    /// resting on the bottom of the row.
    #[must_use]
    pub fn coin_bounds(&self, cell: CellCoord) -> Aabb {
        let size = Vec2::splat(self.row_height);
        let min = Vec2::new(
            self.column_center(cell.column()) - size.x * 0.5,
            self.row_top(cell.row()),
        );
        Aabb::new(min, size)
    }

    /// Removes the coin in the tile, reporting whether one was present.
    pub(crate) fn take_coin(&mut self, cell: CellCoord) -> bool {
        let Ok(index) = usize::try_from(cell.row()) else {
            return false;
        };
        self.cells
            .get_mut(index)
            .map_or(false, |row| row.coins.remove(&cell.column()))
    }

    /// Y coordinate of the top edge of the row.
    #[must_use]
    pub fn row_top(&self, row: u32) -> f32 {
        row as f32 * self.row_height
    }

    /// X coordinate of the centre of the column.
    #[must_use]
    pub fn column_center(&self, column: u32) -> f32 {
        (column as f32 + 0.5) * self.column_width
    }

    /// Rectangle covered by the tile.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellCoord) -> Aabb {
        Aabb::new(
            Vec2::new(
                cell.column() as f32 * self.column_width,
                self.row_top(cell.row()),
            ),
            Vec2::new(self.column_width, self.row_height),
        )
    }

    /// Columns touched by the horizontal extent `left..right`.
    #[must_use]
    pub fn columns_between(&self, left: f32, right: f32) -> Option<(u32, u32)> {
        if self.columns == 0 || right <= 0.0 || left >= self.width() || right <= left {
            return None;
        }
        let last_index = self.columns - 1;
        let first = clamp_index((left / self.column_width).floor(), last_index);
        let last = clamp_index((right / self.column_width).ceil() - 1.0, last_index).max(first);
        Some((first, last))
    }

    /// Rows touched by the vertical extent `top..bottom`.
    #[must_use]
    pub fn rows_between(&self, top: f32, bottom: f32) -> Option<(u32, u32)> {
        if self.rows == 0 || bottom <= 0.0 || top >= self.height() || bottom <= top {
            return None;
        }
        let last_index = self.rows - 1;
        let first = clamp_index((top / self.row_height).floor(), last_index);
        let last = clamp_index((bottom / self.row_height).ceil() - 1.0, last_index).max(first);
        Some((first, last))
    }

    /// First row top in `from_y..=to_y` that offers a surface under the
    /// horizontal extent `left..right`.
    ///
    /// Ladder tops count as surfaces when `include_ladder_tops` is set.
    #[must_use]
    pub fn surface_between(
        &self,
        left: f32,
        right: f32,
        from_y: f32,
        to_y: f32,
        include_ladder_tops: bool,
    ) -> Option<f32> {
        let (first_column, last_column) = self.columns_between(left, right)?;
        let (first_row, last_row) = self.row_tops_between(from_y, to_y)?;

        (first_row..=last_row)
            .find(|row| {
                (first_column..=last_column).any(|column| {
                    let cell = CellCoord::new(column, *row);
                    self.is_ground(cell) || (include_ladder_tops && self.is_ladder_top(cell))
                })
            })
            .map(|row| self.row_top(row))
    }

    /// Lowest ground underside in `to_y..=from_y` above the horizontal extent
    /// `left..right`, used by bodies travelling upward.
    #[must_use]
    pub fn ceiling_between(&self, left: f32, right: f32, from_y: f32, to_y: f32) -> Option<f32> {
        let (first_column, last_column) = self.columns_between(left, right)?;
        let (first_row, last_row) = self.row_tops_between(to_y - self.row_height, from_y - self.row_height)?;

        (first_row..=last_row)
            .rev()
            .find(|row| {
                (first_column..=last_column).any(|column| self.is_ground(CellCoord::new(column, *row)))
            })
            .map(|row| self.row_top(row) + self.row_height)
    }

    /// Column of the ladder whose centre lies within `reach` of `center_x`
    /// among the rows `first_row..=last_row`.
    #[must_use]
    pub fn ladder_near(&self, center_x: f32, reach: f32, first_row: u32, last_row: u32) -> Option<u32> {
        let (first_column, last_column) = self.columns_between(center_x - reach, center_x + reach)?;
        (first_column..=last_column)
            .filter(|column| (self.column_center(*column) - center_x).abs() <= reach)
            .find(|column| {
                (first_row..=last_row.min(self.rows.saturating_sub(1)))
                    .any(|row| self.is_ladder(CellCoord::new(*column, row)))
            })
    }

    fn row_tops_between(&self, from_y: f32, to_y: f32) -> Option<(u32, u32)> {
        if self.rows == 0 || to_y < from_y || to_y < 0.0 {
            return None;
        }
        let last_index = self.rows - 1;
        let first = (from_y / self.row_height).ceil().max(0.0);
        let last = (to_y / self.row_height).floor();
        if first > last || first > last_index as f32 {
            return None;
        }
        Some((first as u32, clamp_index(last, last_index)))
    }

    fn row(&self, row: u32) -> Option<&TowerRow> {
        usize::try_from(row).ok().and_then(|index| self.cells.get(index))
    }
}

fn covers(spans: &[ColumnSpan], column: u32) -> bool {
    spans.iter().any(|span| span.contains(column))
}

fn clamp_index(value: f32, last_index: u32) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= last_index as f32 {
        last_index
    } else {
        value as u32
    }
}

//! Static level descriptions and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_platformer_core::{Archetype, CellCoord, ColumnSpan};

const GROUND_GLYPH: char = 'X';
const LADDER_GLYPH: char = 'H';
const COIN_GLYPH: char = 'o';
const PLAYER_GLYPH: char = 'P';
const EMPTY_GLYPHS: [char; 2] = [' ', '.'];

/// Structured description of a tower consumed once when a level loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Human readable level name.
    pub name: String,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Per-row content, index 0 being the top row.
    pub layout: Vec<RowDescription>,
    /// Tile the player starts in.
    pub player: CellCoord,
    /// Monsters spawned when the level starts.
    #[serde(default)]
    pub monsters: Vec<MonsterSpawn>,
}

/// Content of a single row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowDescription {
    /// Column ranges that can be stood upon.
    pub ground: Vec<ColumnSpan>,
    /// Column ranges that can be climbed.
    pub ladders: Vec<ColumnSpan>,
    /// Columns holding a coin.
    pub coins: Vec<u32>,
}

/// Spawn point for a single monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSpawn {
    /// Behavioural class of the monster.
    pub archetype: Archetype,
    /// Tile the monster spawns in.
    pub cell: CellCoord,
    /// Patrol extent in tiles on each side of the spawn tile: rows for
    /// vertical archetypes, columns for flyers.
    #[serde(default)]
    pub range: Option<u32>,
}

/// Compact tower description using one string per row.
///
/// `X` marks ground, `H` a ladder, `o` a coin, `P` the player start and
/// `B`, `F`, `S`, `N` the BLOCK, FLY, SLIME and SNAIL spawns. Spaces and dots
/// are empty tiles. Rows shorter than the widest row are padded with empty
/// tiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMap {
    /// Human readable level name.
    pub name: String,
    /// Rows of the tower from top to bottom.
    pub map: Vec<String>,
}

impl LevelDescription {
    /// Parses either the structured or the map JSON form and validates the result.
    pub fn from_json(source: &str) -> Result<Self, LevelError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        let level = if value.get("map").is_some() {
            let map: LevelMap = serde_json::from_value(value)?;
            Self::from_map(&map)?
        } else {
            serde_json::from_value(value)?
        };
        level.validate()?;
        Ok(level)
    }

    /// Serialises the structured form as compact JSON.
    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Converts the map form into a structured description.
    pub fn from_map(map: &LevelMap) -> Result<Self, LevelError> {
        let rows = u32::try_from(map.map.len()).map_err(|_| LevelError::EmptyGrid {
            columns: 0,
            rows: 0,
        })?;
        let widest = map
            .map
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let columns = u32::try_from(widest).map_err(|_| LevelError::EmptyGrid { columns: 0, rows })?;

        let mut layout = Vec::with_capacity(map.map.len());
        let mut player = None;
        let mut monsters = Vec::new();

        for (row, line) in (0..rows).zip(map.map.iter()) {
            let mut description = RowDescription::default();
            let mut ground = RunBuilder::default();
            let mut ladders = RunBuilder::default();

            for (column, glyph) in (0..columns).zip(line.chars()) {
                let cell = CellCoord::new(column, row);
                match glyph {
                    GROUND_GLYPH => ground.push(column),
                    LADDER_GLYPH => ladders.push(column),
                    COIN_GLYPH => description.coins.push(column),
                    PLAYER_GLYPH => {
                        if player.replace(cell).is_some() {
                            return Err(LevelError::DuplicatePlayer { column, row });
                        }
                    }
                    glyph if EMPTY_GLYPHS.contains(&glyph) => {}
                    glyph => match Archetype::from_glyph(glyph) {
                        Some(archetype) => monsters.push(MonsterSpawn {
                            archetype,
                            cell,
                            range: None,
                        }),
                        None => return Err(LevelError::UnknownGlyph { column, row, glyph }),
                    },
                }
            }

            description.ground = ground.finish();
            description.ladders = ladders.finish();
            layout.push(description);
        }

        let player = player.ok_or(LevelError::MissingPlayer)?;

        Ok(Self {
            name: map.name.clone(),
            columns,
            rows,
            layout,
            player,
            monsters,
        })
    }

    /// Checks every structural invariant of the description.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LevelError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let expected = usize::try_from(self.rows).unwrap_or(usize::MAX);
        if self.layout.len() != expected {
            return Err(LevelError::RowCountMismatch {
                expected: self.rows,
                actual: self.layout.len(),
            });
        }

        for (row, description) in (0..self.rows).zip(self.layout.iter()) {
            for span in description.ground.iter().chain(description.ladders.iter()) {
                if !span.fits_within(self.columns) {
                    return Err(LevelError::SpanOutOfBounds {
                        row,
                        first: span.first(),
                        last: span.last(),
                        columns: self.columns,
                    });
                }
            }
            if let Some(&column) = description
                .coins
                .iter()
                .find(|column| **column >= self.columns)
            {
                return Err(LevelError::CoinOutOfBounds { column, row });
            }
        }

        if !self.contains(self.player) {
            return Err(LevelError::PlayerOutOfBounds {
                column: self.player.column(),
                row: self.player.row(),
            });
        }

        if let Some((index, spawn)) = self
            .monsters
            .iter()
            .enumerate()
            .find(|(_, spawn)| !self.contains(spawn.cell))
        {
            return Err(LevelError::MonsterOutOfBounds {
                index,
                column: spawn.cell.column(),
                row: spawn.cell.row(),
            });
        }

        Ok(())
    }

    fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }
}

#[derive(Default)]
struct RunBuilder {
    spans: Vec<ColumnSpan>,
    open: Option<(u32, u32)>,
}

impl RunBuilder {
    fn push(&mut self, column: u32) {
        match self.open {
            Some((first, last)) if last + 1 == column => self.open = Some((first, column)),
            Some((first, last)) => {
                self.spans.push(ColumnSpan::new(first, last));
                self.open = Some((column, column));
            }
            None => self.open = Some((column, column)),
        }
    }

    fn finish(mut self) -> Vec<ColumnSpan> {
        if let Some((first, last)) = self.open.take() {
            self.spans.push(ColumnSpan::new(first, last));
        }
        self.spans
    }
}

/// Reasons a level description is rejected.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The JSON document could not be parsed.
    #[error("malformed level description: {0}")]
    Parse(#[from] serde_json::Error),
    /// The grid has no tiles.
    #[error("tower grid must not be empty (received {columns}x{rows})")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// The number of row descriptions disagrees with the declared row count.
    #[error("expected {expected} row descriptions, found {actual}")]
    RowCountMismatch {
        /// Declared row count.
        expected: u32,
        /// Number of row descriptions supplied.
        actual: usize,
    },
    /// A ground or ladder span is inverted or leaves the grid.
    #[error("span {first}..={last} in row {row} does not fit {columns} columns")]
    SpanOutOfBounds {
        /// Row holding the span.
        row: u32,
        /// First column of the span.
        first: u32,
        /// Last column of the span.
        last: u32,
        /// Declared column count.
        columns: u32,
    },
    /// A coin lies outside the grid.
    #[error("coin at column {column} in row {row} lies outside the grid")]
    CoinOutOfBounds {
        /// Column of the coin.
        column: u32,
        /// Row of the coin.
        row: u32,
    },
    /// The player start lies outside the grid.
    #[error("player start ({column}, {row}) lies outside the grid")]
    PlayerOutOfBounds {
        /// Column of the start tile.
        column: u32,
        /// Row of the start tile.
        row: u32,
    },
    /// A monster spawn lies outside the grid.
    #[error("monster spawn #{index} at ({column}, {row}) lies outside the grid")]
    MonsterOutOfBounds {
        /// Position of the spawn in the monster list.
        index: usize,
        /// Column of the spawn tile.
        column: u32,
        /// Row of the spawn tile.
        row: u32,
    },
    /// The map form contains a character with no meaning.
    #[error("unknown map glyph {glyph:?} at ({column}, {row})")]
    UnknownGlyph {
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
        /// Offending character.
        glyph: char,
    },
    /// The map form has no player start.
    #[error("map has no player start")]
    MissingPlayer,
    /// The map form has more than one player start.
    #[error("second player start found at ({column}, {row})")]
    DuplicatePlayer {
        /// Column of the duplicate.
        column: u32,
        /// Row of the duplicate.
        row: u32,
    },
    /// The player start leaves the player's head above the tower top.
    #[error("player start ({column}, {row}) needs {needed} rows of headroom")]
    NoHeadroom {
        /// Column of the start tile.
        column: u32,
        /// Row of the start tile.
        row: u32,
        /// Rows the player occupies when standing.
        needed: u32,
    },
}

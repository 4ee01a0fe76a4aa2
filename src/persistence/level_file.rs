use std::path::Path;

use thiserror::Error;

use crate::sim::level::{Level, Tile};

/// First line of every level file
pub const MAGIC_HEADER: &str = "BOMBERMAN_LEVEL";
/// Only version this build reads and writes
pub const LEVEL_VERSION: f32 = 1.0;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level: {0}")]
    Io(#[from] std::io::Error),
    #[error("level file is empty")]
    Empty,
    #[error("expected header {}, found {:?}", MAGIC_HEADER, .0)]
    BadHeader(String),
    #[error("level version {} is not supported (expected {})", .found, LEVEL_VERSION)]
    VersionMismatch { found: f32 },
    #[error("unreadable level version {0:?}")]
    BadVersion(String),
    #[error("bad level dimensions {0:?}")]
    BadDimensions(String),
    #[error("level row {row} is missing")]
    MissingRow { row: usize },
    #[error("level row {row} has {found} tiles, expected {expected}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("bad tile {value:?} at ({x}, {y})")]
    BadTile { x: usize, y: usize, value: String },
}

/// Parse a level from its text form
pub fn parse_level(text: &str) -> Result<Level, LevelError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines.next().ok_or(LevelError::Empty)?;
    if header != MAGIC_HEADER {
        return Err(LevelError::BadHeader(header.to_string()));
    }

    let version_line = lines.next().ok_or(LevelError::BadVersion(String::new()))?;
    let version: f32 = version_line
        .parse()
        .map_err(|_| LevelError::BadVersion(version_line.to_string()))?;
    if version != LEVEL_VERSION {
        return Err(LevelError::VersionMismatch { found: version });
    }

    let dims_line = lines.next().ok_or(LevelError::BadDimensions(String::new()))?;
    let (width, height) = parse_dimensions(dims_line)
        .ok_or_else(|| LevelError::BadDimensions(dims_line.to_string()))?;

    let mut tiles = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = lines.next().ok_or(LevelError::MissingRow { row: y })?;
        let values: Vec<&str> = row.split_whitespace().collect();
        if values.len() < width {
            return Err(LevelError::ShortRow {
                row: y,
                expected: width,
                found: values.len(),
            });
        }
        // Anything past `width` is ignored
        for (x, value) in values.iter().take(width).enumerate() {
            let tile = value
                .parse::<u8>()
                .ok()
                .and_then(Tile::from_index)
                .ok_or_else(|| LevelError::BadTile {
                    x,
                    y,
                    value: value.to_string(),
                })?;
            tiles.push(tile);
        }
    }

    Ok(Level::new(width as i32, height as i32, tiles))
}

fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let width: usize = parts.next()?.parse().ok()?;
    let height: usize = parts.next()?.parse().ok()?;
    let max = i32::MAX as usize;
    let area = width.checked_mul(height)?;
    (width > 0 && height > 0 && width <= max && height <= max && area <= max)
        .then_some((width, height))
}

/// Read and parse a level file
pub fn load_level(path: impl AsRef<Path>) -> Result<Level, LevelError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let level = parse_level(&text)?;
    log::info!(
        "Loaded {}x{} level from {}",
        level.width(),
        level.height(),
        path.display()
    );
    Ok(level)
}

/// Write the level's current grid to `path`
pub fn save_level(level: &Level, path: impl AsRef<Path>) -> Result<(), LevelError> {
    std::fs::write(path.as_ref(), level.to_level_string())?;
    log::info!("Saved level to {}", path.as_ref().display());
    Ok(())
}

impl Level {
    /// Current grid in level file format
    pub fn to_level_string(&self) -> String {
        let mut out = format!(
            "{MAGIC_HEADER}\n{LEVEL_VERSION:.1}\n{} {}\n",
            self.width(),
            self.height()
        );
        for row in self.tiles().chunks(self.width() as usize) {
            let line: Vec<String> = row.iter().map(|t| t.index().to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }
}

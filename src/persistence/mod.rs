//! Level file persistence
//!
//! Text format, one header line, one version line, `width height`, then one
//! whitespace-separated row of tile values per grid row:
//!
//! ```text
//! BOMBERMAN_LEVEL
//! 1.0
//! 5 3
//! 4 4 4 4 4
//! 4 0 2 0 4
//! 4 4 4 4 4
//! ```

mod level_file;

pub use level_file::{
    LEVEL_VERSION, LevelError, MAGIC_HEADER, load_level, parse_level, save_level,
};

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Editor settings: the selected game and the mip-map import options.
//!
//! Settings start from [`EditorSettings::default`], may be overridden by a RON
//! file named in the `GXBANK_CONFIG` environment variable, and are then adjusted
//! by `-game`, `-mipmaps` and `-interpolate` commands.

use crate::error::{BankError, BankResult};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

/// Environment variable naming an optional RON settings file.
pub const CONFIG_ENV_VAR: &str = "GXBANK_CONFIG";

/// The game whose container layout the codecs read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    /// Super Monkey Ball 1 and 2 (GameCube).
    #[default]
    Smb,
    /// Super Monkey Ball Deluxe (PS2 / Xbox).
    Deluxe,
    /// F-Zero GX (GameCube).
    #[serde(rename = "fzero")]
    FZero,
}

/// Byte order of multi-byte fields inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl Game {
    /// The byte order used by this game's containers.
    pub const fn byte_order(self) -> ByteOrder {
        match self {
            Game::Smb | Game::FZero => ByteOrder::Big,
            Game::Deluxe => ByteOrder::Little,
        }
    }

    /// The spelling accepted by the `-game` command.
    pub const fn as_str(self) -> &'static str {
        match self {
            Game::Smb => "smb",
            Game::Deluxe => "deluxe",
            Game::FZero => "fzero",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smb" => Ok(Game::Smb),
            "deluxe" => Ok(Game::Deluxe),
            "fzero" => Ok(Game::FZero),
            other => Err(BankError::argument(format!(
                "Unknown game '{other}' (expected smb, deluxe or fzero)"
            ))),
        }
    }
}

/// The resampling filter used when building mip levels from a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Bilinear (triangle) filtering.
    #[default]
    Default,
    /// Nearest-neighbour sampling.
    Nearest,
}

impl FromStr for Interpolation {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Interpolation::Default),
            "nearest" | "nn" => Ok(Interpolation::Nearest),
            other => Err(BankError::argument(format!(
                "Unknown interpolation '{other}' (expected default, nearest or nn)"
            ))),
        }
    }
}

/// Parses the non-negative integer argument of `-mipmaps` / `-setAllMipmaps`.
pub fn parse_mipmap_count(s: &str) -> BankResult<u32> {
    s.parse::<u32>()
        .map_err(|_| BankError::argument(format!("'{s}' is not a non-negative integer")))
}

/// Everything that parameterizes codec behavior and mip-map generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// The game selected for subsequent loads and saves.
    pub game: Game,
    /// Number of mip-maps below level 0 to generate on import.
    /// `None` generates levels until a dimension turns odd.
    pub mipmap_count: Option<u32>,
    /// Resampling filter for generated levels.
    pub interpolation: Interpolation,
}

impl EditorSettings {
    /// The maximum number of levels (level 0 included) a generated chain may hold.
    pub fn level_cap(&self) -> Option<u32> {
        self.mipmap_count.map(|count| count.saturating_add(1))
    }

    /// Parses settings from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> BankResult<Self> {
        ron::from_str(text).map_err(|e| BankError::format(format!("invalid settings: {e}")))
    }

    /// Reads settings from a RON file.
    pub fn load(path: &Path) -> BankResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BankError::io(format!("reading settings '{}'", path.display()), e))?;
        Self::from_ron_str(&text)
    }

    /// Reads the file named by [`CONFIG_ENV_VAR`], or returns defaults when unset.
    pub fn from_env() -> BankResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                log::info!("Loading settings from {}", Path::new(&path).display());
                Self::load(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn game_names_round_trip() {
        for game in [Game::Smb, Game::Deluxe, Game::FZero] {
            assert_eq!(game.as_str().parse::<Game>().unwrap(), game);
        }
        let err = "bogus".parse::<Game>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentError);
    }

    #[test]
    fn deluxe_is_little_endian() {
        assert_eq!(Game::Smb.byte_order(), ByteOrder::Big);
        assert_eq!(Game::FZero.byte_order(), ByteOrder::Big);
        assert_eq!(Game::Deluxe.byte_order(), ByteOrder::Little);
    }

    #[test]
    fn interpolation_accepts_nn_alias() {
        assert_eq!("nn".parse::<Interpolation>().unwrap(), Interpolation::Nearest);
        assert_eq!(
            "nearest".parse::<Interpolation>().unwrap(),
            Interpolation::Nearest
        );
        assert_eq!(
            "default".parse::<Interpolation>().unwrap(),
            Interpolation::Default
        );
        assert!("bicubic".parse::<Interpolation>().is_err());
    }

    #[test]
    fn mipmap_count_rejects_negative_and_garbage() {
        assert_eq!(parse_mipmap_count("0").unwrap(), 0);
        assert_eq!(parse_mipmap_count("5").unwrap(), 5);
        assert!(parse_mipmap_count("-1").is_err());
        assert!(parse_mipmap_count("four").is_err());
    }

    #[test]
    fn level_cap_counts_level_zero() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.level_cap(), None);
        settings.mipmap_count = Some(0);
        assert_eq!(settings.level_cap(), Some(1));
        settings.mipmap_count = Some(3);
        assert_eq!(settings.level_cap(), Some(4));
    }

    #[test]
    fn settings_from_ron_keep_defaults_for_missing_fields() {
        let settings = EditorSettings::from_ron_str("(game: fzero)").unwrap();
        assert_eq!(settings.game, Game::FZero);
        assert_eq!(settings.mipmap_count, None);
        assert_eq!(settings.interpolation, Interpolation::Default);

        let settings =
            EditorSettings::from_ron_str("(mipmap_count: Some(2), interpolation: nearest)")
                .unwrap();
        assert_eq!(settings.mipmap_count, Some(2));
        assert_eq!(settings.interpolation, Interpolation::Nearest);
    }

    #[test]
    fn settings_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(game: deluxe)").unwrap();
        let settings = EditorSettings::load(file.path()).unwrap();
        assert_eq!(settings.game, Game::Deluxe);

        let missing = EditorSettings::load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}

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

//! Mip-chain generation.

use super::pixel;
use gxbank_core::asset::{MipLevel, TextureFormat, TextureSlot};
use gxbank_core::{BankError, BankResult, EditorSettings, Interpolation};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// A lane that builds a full texture slot from one source image.
///
/// Level 0 is the source itself. Every smaller level is resampled from the
/// full-resolution source, never from the previous level, and the chain stops at the
/// first level with an odd dimension or when the level cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MipChainLane {
    /// Resampling filter for levels below 0.
    pub filter: Interpolation,
    /// Maximum number of levels, level 0 included. `None` means "until odd".
    pub level_cap: Option<u32>,
}

impl MipChainLane {
    /// Creates a lane using the import settings of an editor session.
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            filter: settings.interpolation,
            level_cap: settings.level_cap(),
        }
    }

    /// The dimensions of every level the chain will hold for a `width`x`height` source.
    pub fn level_dimensions(&self, width: u32, height: u32) -> Vec<(u32, u32)> {
        let mut dims = Vec::new();
        let (mut w, mut h) = (width, height);
        loop {
            dims.push((w, h));
            if w % 2 == 1 || h % 2 == 1 {
                break;
            }
            if self
                .level_cap
                .is_some_and(|cap| dims.len() >= cap as usize)
            {
                break;
            }
            w /= 2;
            h /= 2;
        }
        dims
    }

    /// Generates and encodes the chain for `source`.
    pub fn generate(&self, source: &RgbaImage, format: TextureFormat) -> BankResult<TextureSlot> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(BankError::format("source image has no pixels"));
        }

        let filter = filter_type(self.filter);
        let mut levels = Vec::new();
        for (level, (w, h)) in self.level_dimensions(width, height).into_iter().enumerate() {
            let data = if level == 0 {
                pixel::encode_level(format, source)?
            } else {
                pixel::encode_level(format, &imageops::resize(source, w, h, filter))?
            };
            levels.push(MipLevel {
                width: w,
                height: h,
                data,
            });
        }
        log::debug!(
            "Generated {} level(s) of {format:?} from a {width}x{height} image",
            levels.len()
        );
        Ok(TextureSlot::new(format, levels))
    }
}

/// Maps the editor's filter setting onto the `image` crate's filters.
fn filter_type(interpolation: Interpolation) -> FilterType {
    match interpolation {
        Interpolation::Default => FilterType::Triangle,
        Interpolation::Nearest => FilterType::Nearest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn lane(level_cap: Option<u32>) -> MipChainLane {
        MipChainLane {
            filter: Interpolation::Default,
            level_cap,
        }
    }

    #[test]
    fn power_of_two_source_halves_down_to_one_texel() {
        let dims = lane(None).level_dimensions(256, 256);
        assert_eq!(dims.len(), 9);
        assert_eq!(dims[0], (256, 256));
        assert_eq!(dims[8], (1, 1));
    }

    #[test]
    fn odd_source_yields_a_single_level() {
        assert_eq!(lane(None).level_dimensions(17, 17), vec![(17, 17)]);
    }

    #[test]
    fn chain_stops_at_first_odd_dimension() {
        assert_eq!(
            lane(None).level_dimensions(24, 8),
            vec![(24, 8), (12, 4), (6, 2), (3, 1)]
        );
    }

    #[test]
    fn level_cap_limits_the_chain() {
        assert_eq!(lane(Some(1)).level_dimensions(64, 64), vec![(64, 64)]);
        assert_eq!(lane(Some(3)).level_dimensions(64, 64).len(), 3);
        assert_eq!(lane(Some(100)).level_dimensions(64, 64).len(), 7);
    }

    #[test]
    fn settings_translate_mipmap_count_to_a_cap() {
        let settings = EditorSettings {
            mipmap_count: Some(2),
            interpolation: Interpolation::Nearest,
            ..EditorSettings::default()
        };
        let lane = MipChainLane::from_settings(&settings);
        assert_eq!(lane.level_cap, Some(3));
        assert_eq!(lane.filter, Interpolation::Nearest);
    }

    #[test]
    fn generated_levels_are_encoded_in_the_target_format() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]));
        let slot = lane(None).generate(&source, TextureFormat::Rgb5a3).unwrap();
        assert_eq!(slot.format, TextureFormat::Rgb5a3);
        assert_eq!(slot.levels().len(), 5);
        for level in slot.levels() {
            assert_eq!(
                level.data.len(),
                TextureFormat::Rgb5a3.level_size(level.width, level.height)
            );
        }
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(lane(None).generate(&RgbaImage::new(0, 0), TextureFormat::I8).is_err());
    }
}

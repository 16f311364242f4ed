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

//! Bitmap file loading and saving.

use gxbank_core::codec::ImageFileCodec;
use gxbank_core::{BankError, BankResult};
use image::{ImageError, RgbaImage};
use std::path::Path;

/// A lane dedicated to reading and writing bitmap files through the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileLane;

impl ImageFileCodec for ImageFileLane {
    fn load_image(&self, path: &Path) -> BankResult<RgbaImage> {
        // Decode whatever the file holds, then normalize to RGBA8.
        let image = image::open(path)
            .map_err(|e| image_error(e, format!("loading image '{}'", path.display())))?;
        Ok(image.to_rgba8())
    }

    fn save_image(&self, image: &RgbaImage, path: &Path) -> BankResult<()> {
        image
            .save(path)
            .map_err(|e| image_error(e, format!("saving image '{}'", path.display())))
    }
}

fn image_error(error: ImageError, context: String) -> BankError {
    match error {
        ImageError::IoError(source) => BankError::io(context, source),
        other => BankError::format(format!("{context}: {other}")),
    }
}

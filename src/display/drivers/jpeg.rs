/*
 *  display/drivers/jpeg.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Preview sink: the frame as a JPEG on disk
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use embedded_graphics::prelude::*;
use image::{Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use log::info;

use crate::display::Canvas;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, OutputSink, SinkCapabilities};

pub const JPEG_QUALITY: u8 = 90;

/// Palette canvas to an RGB image
pub fn to_rgb_image(canvas: &Canvas) -> RgbImage {
    let width = canvas.width() as u32;
    let height = canvas.height() as u32;
    let pixels = canvas.as_slice();
    RgbImage::from_fn(width, height, |x, y| {
        let rgb = pixels[(y * width + x) as usize].to_rgb();
        Rgb([rgb.r(), rgb.g(), rgb.b()])
    })
}

/// Writes every frame to the same file, replacing the last one.
#[derive(Debug)]
pub struct JpegFileSink {
    path: PathBuf,
    capabilities: SinkCapabilities,
}

impl JpegFileSink {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            capabilities: SinkCapabilities {
                width,
                height,
                color_depth: ColorDepth::Rgb888,
                slow_refresh: false,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for JpegFileSink {
    fn name(&self) -> &str {
        "jpeg-preview"
    }

    fn capabilities(&self) -> &SinkCapabilities {
        &self.capabilities
    }

    fn show(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        self.check_canvas(canvas)?;
        let image = to_rgb_image(canvas);

        let mut writer = BufWriter::new(File::create(&self.path)?);
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(&image)?;
        writer.flush()?;

        info!("Saved preview to {}", self.path.display());
        Ok(())
    }
}

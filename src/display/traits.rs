/*
 *  display/traits.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Output sink abstraction
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

use embedded_graphics::prelude::*;

use crate::display::Canvas;
use crate::display::error::DisplayError;

/// How a sink stores colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 7-colour palette, 4 bits per pixel on the wire
    /// Used by: Inky Impression 7.3"
    Palette7,

    /// 24-bit RGB
    /// Used by: JPEG preview
    Rgb888,
}

/// Sink capabilities and metadata
#[derive(Debug, Clone)]
pub struct SinkCapabilities {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    pub color_depth: ColorDepth,

    /// Whether a `show` is a slow physical refresh
    pub slow_refresh: bool,
}

/// Where a finished frame goes.
///
/// Exactly one sink is chosen per run; it never changes what gets drawn.
pub trait OutputSink {
    /// Short name for logging
    fn name(&self) -> &str;

    fn capabilities(&self) -> &SinkCapabilities;

    /// Push one complete frame
    fn show(&mut self, canvas: &Canvas) -> Result<(), DisplayError>;

    /// Returns the frame dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Reject a canvas that does not match the sink
    fn check_canvas(&self, canvas: &Canvas) -> Result<(), DisplayError> {
        let (width, height) = self.dimensions();
        let size = canvas.size();
        if size.width != width || size.height != height {
            return Err(DisplayError::BufferSizeMismatch {
                expected: (width * height) as usize,
                actual: canvas.as_slice().len(),
            });
        }
        Ok(())
    }
}

/*
 *  display/error.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Error types for rendering and output sinks
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

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while drawing or while pushing a frame to a sink
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Panel probe found nothing usable
    #[error("Display not detected: {0}")]
    NotDetected(String),

    /// I2C communication error
    #[error("I2C communication error: {0}")]
    I2cError(String),

    /// SPI communication error
    #[error("SPI communication error: {0}")]
    SpiError(String),

    /// GPIO line error
    #[error("GPIO error: {0}")]
    GpioError(String),

    /// Framebuffer size mismatch
    #[error("Buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Text layout or rasterisation failed
    #[error("Text rendering error: {0}")]
    TextError(String),

    /// Preview encoding failed
    #[error("Image encode error: {0}")]
    EncodeError(#[from] image::ImageError),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "driver-inky")]
impl From<linux_embedded_hal::I2CError> for DisplayError {
    fn from(err: linux_embedded_hal::I2CError) -> Self {
        DisplayError::I2cError(format!("{:?}", err))
    }
}

#[cfg(feature = "driver-inky")]
impl From<linux_embedded_hal::gpio_cdev::errors::Error> for DisplayError {
    fn from(err: linux_embedded_hal::gpio_cdev::errors::Error) -> Self {
        DisplayError::GpioError(err.to_string())
    }
}

/// Font loading failures. Always fatal, raised before any drawing.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font file not found: {0}")]
    Missing(PathBuf),

    #[error("unable to read font {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable font face in {0}")]
    NoFace(PathBuf),
}

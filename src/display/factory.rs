/*
 *  display/factory.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Picks the output sink once at startup
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

use log::info;

use crate::config::OutputConfig;
use crate::display::drivers::jpeg::JpegFileSink;
use crate::display::traits::OutputSink;

#[cfg(feature = "driver-inky")]
use crate::display::drivers::inky::{self, InkyImpression};

/// Type alias for boxed sink trait objects
pub type BoxedSink = Box<dyn OutputSink>;

pub struct SinkFactory;

impl SinkFactory {
    /// Hardware when the panel answers and no preview was asked for,
    /// otherwise a JPEG file. Never fails: the file sink is always there.
    pub fn select(config: &OutputConfig, width: u32, height: u32) -> BoxedSink {
        if config.force_preview() {
            info!("Preview forced, writing to {}", config.preview_path().display());
            return Self::preview(config, width, height);
        }

        #[cfg(feature = "driver-inky")]
        if let Some(sink) = Self::try_inky(config) {
            return sink;
        }

        #[cfg(not(feature = "driver-inky"))]
        info!("Built without panel support");

        info!("No display found, saving preview to {}", config.preview_path().display());
        Self::preview(config, width, height)
    }

    fn preview(config: &OutputConfig, width: u32, height: u32) -> BoxedSink {
        Box::new(JpegFileSink::new(config.preview_path(), width, height))
    }

    #[cfg(feature = "driver-inky")]
    fn try_inky(config: &OutputConfig) -> Option<BoxedSink> {
        let probed = inky::probe(config.i2c_bus())
            .and_then(|eeprom| InkyImpression::new(config, eeprom));
        match probed {
            Ok(panel) => {
                info!("Display detected: {}", panel.info().variant_name());
                Some(Box::new(panel))
            }
            Err(e) => {
                info!("Display probe failed: {}", e);
                None
            }
        }
    }
}

/*
 *  display/color.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Seven colour palette of the Inky Impression panels
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

use embedded_graphics::pixelcolor::raw::RawU8;
use embedded_graphics::pixelcolor::{PixelColor, Rgb888};
use embedded_graphics::prelude::RgbColor;

/// Colours the 7-colour e-ink controller can show.
///
/// The discriminant is the palette index the controller expects, so the
/// framebuffer can be packed without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum InkyColor {
    #[default]
    Black = 0,
    White = 1,
    Green = 2,
    Blue = 3,
    Red = 4,
    Yellow = 5,
    Orange = 6,
}

impl PixelColor for InkyColor {
    type Raw = RawU8;
}

impl InkyColor {
    /// Palette index (0..=6)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Nominal RGB used for previews.
    pub fn to_rgb(self) -> Rgb888 {
        match self {
            InkyColor::Black => Rgb888::BLACK,
            InkyColor::White => Rgb888::WHITE,
            InkyColor::Green => Rgb888::new(0, 255, 0),
            InkyColor::Blue => Rgb888::new(0, 0, 255),
            InkyColor::Red => Rgb888::new(255, 0, 0),
            InkyColor::Yellow => Rgb888::new(255, 255, 0),
            InkyColor::Orange => Rgb888::new(255, 128, 0),
        }
    }

    /// Lower-case name for log lines.
    pub fn name(self) -> &'static str {
        match self {
            InkyColor::Black => "black",
            InkyColor::White => "white",
            InkyColor::Green => "green",
            InkyColor::Blue => "blue",
            InkyColor::Red => "red",
            InkyColor::Yellow => "yellow",
            InkyColor::Orange => "orange",
        }
    }
}

/*
 *  weather_glyph.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Tempest icon codes to Weather Icons font glyphs
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

use crate::display::color::InkyColor;

/// wi-cloudy, used for anything we don't recognise
pub const DEFAULT_GLYPH: (char, InkyColor) = ('\u{f013}', InkyColor::Black);

/// Icon code, glyph codepoint in weathericons.ttf, tint
pub const ICON_TABLE: [(&str, char, InkyColor); 24] = [
    ("clear-day",                   '\u{f00d}', InkyColor::Orange),
    ("clear-night",                 '\u{f02e}', InkyColor::Black),
    ("cloudy",                      '\u{f013}', InkyColor::Black),
    ("partly-cloudy-day",           '\u{f002}', InkyColor::Orange),
    ("partly-cloudy-night",         '\u{f031}', InkyColor::Black),
    ("foggy",                       '\u{f014}', InkyColor::Black),
    ("windy",                       '\u{f050}', InkyColor::Black),
    ("rainy",                       '\u{f019}', InkyColor::Blue),
    ("possibly-rainy-day",          '\u{f008}', InkyColor::Blue),
    ("possibly-rainy-night",        '\u{f028}', InkyColor::Blue),
    ("very-light-rain",             '\u{f01c}', InkyColor::Blue),
    ("snow",                        '\u{f01b}', InkyColor::Blue),
    ("possibly-snow-day",           '\u{f00a}', InkyColor::Blue),
    ("possibly-snow-night",         '\u{f02a}', InkyColor::Blue),
    ("sleet",                       '\u{f0b5}', InkyColor::Blue),
    ("possibly-sleet-day",          '\u{f0b2}', InkyColor::Blue),
    ("possibly-sleet-night",        '\u{f0b4}', InkyColor::Blue),
    ("wintry-mix-likely",           '\u{f017}', InkyColor::Blue),
    ("wintry-mix-possible",         '\u{f017}', InkyColor::Blue),
    ("thunderstorm",                '\u{f01e}', InkyColor::Red),
    ("thunderstorms-likely",        '\u{f01e}', InkyColor::Red),
    ("thunderstorms-possible",      '\u{f01d}', InkyColor::Red),
    ("possibly-thunderstorm-day",   '\u{f010}', InkyColor::Red),
    ("possibly-thunderstorm-night", '\u{f02d}', InkyColor::Red),
];

/// Glyph and tint for a Tempest icon code. Unknown codes get a black cloud.
pub fn icon_glyph(code: &str) -> (char, InkyColor) {
    ICON_TABLE
        .iter()
        .find(|(name, _, _)| *name == code)
        .map(|&(_, glyph, color)| (glyph, color))
        .unwrap_or(DEFAULT_GLYPH)
}

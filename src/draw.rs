/*
 *  draw.rs
 *
 *  tempest-dash - weather at a glance
 *  (c) 2025-26 Stuart Hunter
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

use embedded_graphics::{
    prelude::*,
    primitives::{Line, PrimitiveStyleBuilder, Rectangle},
};

use crate::display::color::InkyColor;

pub fn draw_line<D>(
    target: &mut D,
    start: Point,
    end: Point,
    color: InkyColor,
    width: u32
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = InkyColor> + OriginDimensions
{
    Line::new(start, end)
        .into_styled(PrimitiveStyleBuilder::new().stroke_width(width).stroke_color(color).build())
        .draw(target)?;
    Ok(())
}

/// Solid filled rectangle, no outline.
pub fn fill_rect<D>(target: &mut D, region: Rectangle, color: InkyColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = InkyColor> + OriginDimensions,
{
    region
        .into_styled(
            PrimitiveStyleBuilder::new()
                .fill_color(color)
                .build(),
        )
        .draw(target)?;
    Ok(())
}

/// Full-width horizontal rule with `margin` pixels left clear at each end.
pub fn draw_hrule<D>(target: &mut D, y: i32, margin: i32, color: InkyColor, width: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = InkyColor> + OriginDimensions,
{
    let right = target.size().width as i32 - margin;
    draw_line(target, Point::new(margin, y), Point::new(right, y), color, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;

    #[test]
    fn test_fill_rect_clips_to_target() {
        let mut fb = VarFrameBuf::new(20, 10, InkyColor::White);
        fill_rect(&mut fb, Rectangle::new(Point::new(15, 5), Size::new(10, 10)), InkyColor::Red).unwrap();
        assert_eq!(fb.count(InkyColor::Red), 25);
        assert_eq!(fb.pixel(19, 9), Some(InkyColor::Red));
        assert_eq!(fb.pixel(14, 9), Some(InkyColor::White));
    }

    #[test]
    fn test_hrule_respects_margin() {
        let mut fb = VarFrameBuf::new(100, 10, InkyColor::White);
        draw_hrule(&mut fb, 4, 20, InkyColor::Black, 2).unwrap();
        assert_eq!(fb.pixel(10, 4), Some(InkyColor::White));
        assert_eq!(fb.pixel(21, 4), Some(InkyColor::Black));
        assert_eq!(fb.pixel(79, 4), Some(InkyColor::Black));
        assert_eq!(fb.pixel(90, 4), Some(InkyColor::White));
        assert_eq!(fb.rows().filter(|row| row[50] == InkyColor::Black).count(), 2);
    }
}

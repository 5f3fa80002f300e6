//! Startup and fallback screens.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use super::{CENTER_X, CENTER_Y};
use crate::styles::{CENTERED, LABEL, SMALL};

const TITLE_POS: Point = Point::new(CENTER_X, CENTER_Y - 12);
const DETAIL_POS: Point = Point::new(CENTER_X, CENTER_Y + 14);

/// Shown for a moment after a clean startup.
pub fn draw_startup_ok<D>(display: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_text_style("SYSTEM", TITLE_POS, LABEL, CENTERED)
        .draw(display)
        .ok();
    Text::with_text_style("CHECK OK", DETAIL_POS, LABEL, CENTERED)
        .draw(display)
        .ok();
}

/// Shown while the loop recovers from a failed tick.
pub fn draw_loop_error<D>(display: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_text_style("LOOP ERR", TITLE_POS, LABEL, CENTERED)
        .draw(display)
        .ok();
    Text::with_text_style("restarting", DETAIL_POS, SMALL, CENTERED)
        .draw(display)
        .ok();
}

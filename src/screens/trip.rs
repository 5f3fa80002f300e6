//! Main trip screen.
//!
//! ```text
//! +------------------------------+
//! |                         FE:1 |
//! |   +----------------------+   |
//! |   |        6.40          |   |
//! |   |       L/100KM        |   |
//! |   +----------------------+   |
//! |  7.5 L/100KM                 |
//! | 12.3L   157KM                |
//! +------------------------------+
//! ```

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Rectangle, RoundedRectangle};
use embedded_graphics::text::Text;
use heapless::String;

use super::{CENTER_X, draw_file_errors};
use crate::readout::MainScreen;
use crate::styles::{CENTERED, LEFT_TOP, OUTLINE, SMALL, STAT, VALUE};

const VALUE_POS: Point = Point::new(CENTER_X, 30);
const UNIT_POS: Point = Point::new(CENTER_X, 54);

const VALUE_BOX: Rectangle = Rectangle::new(Point::new(12, 12), Size::new(104, 52));
const VALUE_BOX_RADIUS: Size = Size::new(6, 6);

const AVERAGE_POS: Point = Point::new(4, 78);
const TRIP_POS: Point = Point::new(4, 100);

pub fn draw_trip<D>(
    display: &mut D,
    screen: &MainScreen,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    RoundedRectangle::with_equal_corners(VALUE_BOX, VALUE_BOX_RADIUS)
        .into_styled(OUTLINE)
        .draw(display)
        .ok();

    Text::with_text_style(&screen.rate, VALUE_POS, VALUE, CENTERED)
        .draw(display)
        .ok();
    Text::with_text_style(screen.unit.label(), UNIT_POS, SMALL, CENTERED)
        .draw(display)
        .ok();

    let mut line: String<32> = String::new();
    let _ = write!(line, "{} L/100KM", screen.average);
    Text::with_text_style(&line, AVERAGE_POS, STAT, LEFT_TOP)
        .draw(display)
        .ok();

    line.clear();
    let _ = write!(line, "{}L {}KM", screen.trip_fuel, screen.trip_distance);
    Text::with_text_style(&line, TRIP_POS, STAT, LEFT_TOP)
        .draw(display)
        .ok();

    draw_file_errors(display, screen.file_errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TickReadings;
    use crate::readout::ReadoutConfig;
    use crate::screens::canvas::Canvas;
    use crate::storage::TripRecord;

    fn main_screen(file_errors: u32) -> MainScreen {
        let counters = TripRecord {
            persistent_fuel_l: 7.5,
            persistent_distance_km: 100.0,
            trip_fuel_l: 12.3,
            trip_distance_km: 157.0,
        };
        MainScreen::compute(&ReadoutConfig::DEFAULT, &TickReadings::default(), &counters, file_errors)
    }

    #[test]
    fn test_trip_screen_regions() {
        let mut canvas = Canvas::new();
        draw_trip(&mut canvas, &main_screen(0));
        // Value box, statistics lines, nothing in the FE corner.
        assert!(canvas.lit_in(12..116, 12..64) > 0);
        assert!(canvas.lit_in(0..128, 78..120) > 0);
        assert_eq!(canvas.lit_in(90..128, 0..11), 0);
    }

    #[test]
    fn test_trip_screen_shows_file_errors() {
        let mut canvas = Canvas::new();
        draw_trip(&mut canvas, &main_screen(2));
        assert!(canvas.lit_in(90..128, 0..11) > 0);
    }
}

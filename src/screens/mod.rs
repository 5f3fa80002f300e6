//! Everything drawn on the 128x128 monochrome OLED.
//!
//! The tick loop builds one [`Frame`] per tick and hands it to the display
//! driver, which clears its buffer and calls [`draw_frame`].
//!
//! # Screens
//!
//! - **Trip** ([`trip`]): instantaneous consumption in a rounded frame,
//!   lifetime average and trip totals
//! - **Condition** ([`condition`]): full-screen label of one warning; the
//!   STOP ENGINE decoration blinks inverted
//! - **Status** ([`status`]): startup OK and the loop error fallback
//!
//! A non-zero file error counter is drawn as `FE:n` in the top right corner of
//! the trip and condition screens.
//!
//! All drawing functions are generic over `DrawTarget<Color = BinaryColor>`
//! and ignore draw errors: every target used is an in-memory framebuffer.

mod condition;
mod status;
mod trip;

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;

pub use condition::draw_condition;
pub use status::{draw_loop_error, draw_startup_ok};
pub use trip::draw_trip;

use crate::conditions::ErrorKind;
use crate::readout::MainScreen;
use crate::styles::{RIGHT_TOP, SMALL};

pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 128;
pub const CENTER_X: i32 = SCREEN_WIDTH as i32 / 2;
pub const CENTER_Y: i32 = SCREEN_HEIGHT as i32 / 2;

/// One complete screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Main(MainScreen),
    Condition {
        kind: ErrorKind,
        file_errors: u32,
        /// Blink phase for the flashing decoration.
        blink: bool,
    },
    StartupOk,
    LoopError,
}

/// Draw `frame` on a cleared target.
pub fn draw_frame<D>(
    display: &mut D,
    frame: &Frame,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    display.clear(BinaryColor::Off).ok();
    match frame {
        Frame::Main(screen) => draw_trip(display, screen),
        Frame::Condition {
            kind,
            file_errors,
            blink,
        } => {
            draw_condition(display, *kind, *blink);
            draw_file_errors(display, *file_errors);
        }
        Frame::StartupOk => draw_startup_ok(display),
        Frame::LoopError => draw_loop_error(display),
    }
}

const FILE_ERRORS_POS: Point = Point::new(SCREEN_WIDTH as i32 - 2, 1);

/// `FE:n` in the top right corner, nothing when `count` is zero.
pub fn draw_file_errors<D>(
    display: &mut D,
    count: u32,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    if count == 0 {
        return;
    }
    let mut text: String<16> = String::new();
    let _ = write!(text, "FE:{count}");
    Text::with_text_style(&text, FILE_ERRORS_POS, SMALL, RIGHT_TOP)
        .draw(display)
        .ok();
}


#[cfg(test)]
mod tests {
    use super::canvas::Canvas;
    use super::*;

    #[test]
    fn test_file_errors_drawn_only_when_nonzero() {
        let mut canvas = Canvas::new();
        draw_file_errors(&mut canvas, 0);
        assert_eq!(canvas.lit(), 0);

        draw_file_errors(&mut canvas, 3);
        assert!(canvas.lit_in(80..128, 0..12) > 0);
        assert_eq!(canvas.lit_in(0..64, 0..128), 0);
    }

    #[test]
    fn test_every_frame_draws_something() {
        let frames = [
            Frame::StartupOk,
            Frame::LoopError,
            Frame::Condition {
                kind: ErrorKind::LowOil,
                file_errors: 0,
                blink: false,
            },
        ];
        for frame in &frames {
            let mut canvas = Canvas::new();
            draw_frame(&mut canvas, frame);
            assert!(canvas.lit() > 0, "{frame:?}");
        }
    }

    #[test]
    fn test_frame_clears_previous_content() {
        let mut canvas = Canvas::new();
        draw_frame(&mut canvas, &Frame::LoopError);
        let loop_error = canvas.pixels;
        draw_frame(&mut canvas, &Frame::StartupOk);
        assert_ne!(canvas.pixels, loop_error);

        let mut fresh = Canvas::new();
        draw_frame(&mut fresh, &Frame::StartupOk);
        assert_eq!(canvas.pixels, fresh.pixels);
    }
}

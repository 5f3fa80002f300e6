//! Full-screen warning for one condition.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Text;

use super::{CENTER_X, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::conditions::ErrorKind;
use crate::styles::{CENTERED, LABEL, LABEL_INV, LIT_FILL, OUTLINE_THICK};

const BORDER: Rectangle = Rectangle::new(Point::new(0, 12), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT - 12));
const LABEL_POS: Point = Point::new(CENTER_X, 54);
const SUBLABEL_POS: Point = Point::new(CENTER_X, 80);

/// Draw the label of `kind` in a thick border.
///
/// The [`ErrorKind::Warning`] decoration is drawn inverted while `blink` is
/// set. [`ErrorKind::None`] draws nothing.
pub fn draw_condition<D>(
    display: &mut D,
    kind: ErrorKind,
    blink: bool,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    if kind == ErrorKind::None {
        return;
    }
    let info = kind.info();
    let inverted = kind == ErrorKind::Warning && blink;

    if inverted {
        BORDER.into_styled(LIT_FILL).draw(display).ok();
    } else {
        BORDER.into_styled(OUTLINE_THICK).draw(display).ok();
    }

    let style = if inverted { LABEL_INV } else { LABEL };
    Text::with_text_style(info.label, LABEL_POS, style, CENTERED)
        .draw(display)
        .ok();
    Text::with_text_style(info.sublabel, SUBLABEL_POS, style, CENTERED)
        .draw(display)
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::canvas::Canvas;

    #[test]
    fn test_none_draws_nothing() {
        let mut canvas = Canvas::new();
        draw_condition(&mut canvas, ErrorKind::None, true);
        assert_eq!(canvas.lit(), 0);
    }

    #[test]
    fn test_warning_blinks_inverted() {
        let mut steady = Canvas::new();
        draw_condition(&mut steady, ErrorKind::Warning, false);
        let mut flashed = Canvas::new();
        draw_condition(&mut flashed, ErrorKind::Warning, true);
        assert!(flashed.lit() > steady.lit());
    }

    #[test]
    fn test_other_conditions_ignore_blink() {
        let mut a = Canvas::new();
        draw_condition(&mut a, ErrorKind::BrakeFluid, false);
        let mut b = Canvas::new();
        draw_condition(&mut b, ErrorKind::BrakeFluid, true);
        assert_eq!(a.pixels, b.pixels);
    }
}

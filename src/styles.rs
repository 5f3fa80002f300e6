//! Pre-computed text and primitive styles for the monochrome OLED.
//!
//! All styles are `const`: they live in read-only memory and are never built
//! per frame. Inverted variants (`*_INV`) draw dark text on a lit background
//! for the blinking warning screen.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_7X13},
    },
    pixelcolor::BinaryColor,
    primitives::PrimitiveStyle,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::{PROFONT_18_POINT, PROFONT_24_POINT};

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Centered horizontally and vertically on the anchor point.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Left-aligned, anchor on the top edge.
pub const LEFT_TOP: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Right-aligned, anchor on the top edge. Used for the file error counter.
pub const RIGHT_TOP: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Top)
    .build();

// =============================================================================
// Text Styles
// =============================================================================

/// Small status text (6x10).
pub const SMALL: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

/// Statistics lines (7x13).
pub const STAT: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_7X13, BinaryColor::On);

/// Condition labels (`ProFont` 18pt, ~12px wide: eight characters fit).
pub const LABEL: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_18_POINT, BinaryColor::On);

pub const LABEL_INV: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_18_POINT, BinaryColor::Off);

/// Instantaneous consumption (`ProFont` 24pt).
pub const VALUE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_24_POINT, BinaryColor::On);

// =============================================================================
// Primitive Styles
// =============================================================================

pub const OUTLINE: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

pub const OUTLINE_THICK: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 3);

pub const LIT_FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::On);

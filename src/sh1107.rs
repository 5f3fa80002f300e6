//! Blocking SH1107 driver for a 128x128 monochrome OLED on I2C0.
//!
//! Drawing goes to a RAM framebuffer laid out like the controller's GDDRAM:
//! 16 pages of 128 columns, one byte per column holding 8 vertical pixels
//! (LSB on top). [`Sh1107::flush`] writes all pages; at 400 kHz a full frame
//! takes about 50 ms, well inside one tick.

use embassy_rp::i2c::{Blocking, Error, I2c};
use embassy_rp::peripherals::I2C0;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 128;
const PAGES: usize = HEIGHT / 8;
const BUFFER_SIZE: usize = WIDTH * PAGES;

/// 7-bit bus address with SA0 low.
pub const DEFAULT_ADDRESS: u8 = 0x3C;

// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

// SH1107 Commands
const DISPLAY_OFF: u8 = 0xAE;
const DISPLAY_ON: u8 = 0xAF;
const START_LINE: u8 = 0xDC;
const CONTRAST: u8 = 0x81;
const PAGE_ADDRESSING: u8 = 0x20;
const SEGMENT_NORMAL: u8 = 0xA0;
const COM_SCAN_UP: u8 = 0xC0;
const MULTIPLEX: u8 = 0xA8;
const DISPLAY_OFFSET: u8 = 0xD3;
const CLOCK_DIVIDE: u8 = 0xD5;
const PRECHARGE: u8 = 0xD9;
const VCOM_DESELECT: u8 = 0xDB;
const RESUME_RAM: u8 = 0xA4;
const NORMAL_DISPLAY: u8 = 0xA6;
const PAGE_ADDRESS: u8 = 0xB0;
const COLUMN_LOW: u8 = 0x00;
const COLUMN_HIGH: u8 = 0x10;

/// Power-on configuration, one command (with its argument) per entry.
const INIT_SEQUENCE: &[&[u8]] = &[
    &[DISPLAY_OFF],
    &[CLOCK_DIVIDE, 0x51],
    &[PAGE_ADDRESSING],
    &[CONTRAST, 0x4F],
    &[SEGMENT_NORMAL],
    &[COM_SCAN_UP],
    &[START_LINE, 0x00],
    &[DISPLAY_OFFSET, 0x00],
    &[MULTIPLEX, (HEIGHT - 1) as u8],
    &[PRECHARGE, 0x22],
    &[VCOM_DESELECT, 0x35],
    &[RESUME_RAM],
    &[NORMAL_DISPLAY],
];

pub struct Sh1107 {
    i2c: I2c<'static, I2C0, Blocking>,
    address: u8,
    buffer: [u8; BUFFER_SIZE],
}

impl Sh1107 {
    pub fn new(
        i2c: I2c<'static, I2C0, Blocking>,
        address: u8,
    ) -> Self {
        Self {
            i2c,
            address,
            buffer: [0; BUFFER_SIZE],
        }
    }

    /// Configure the controller, blank the panel and switch it on.
    pub fn init(&mut self) -> Result<(), Error> {
        for command in INIT_SEQUENCE {
            self.command(command)?;
        }
        self.buffer.fill(0);
        self.flush()?;
        self.command(&[DISPLAY_ON])
    }

    fn command(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Error> {
        let mut packet = [CONTROL_COMMAND; 4];
        let len = bytes.len().min(packet.len() - 1);
        packet[1..=len].copy_from_slice(&bytes[..len]);
        self.i2c.blocking_write(self.address, &packet[..=len])
    }

    /// Write the framebuffer to the panel.
    pub fn flush(&mut self) -> Result<(), Error> {
        let mut packet = [CONTROL_DATA; WIDTH + 1];
        for page in 0..PAGES {
            self.command(&[PAGE_ADDRESS | page as u8, COLUMN_LOW, COLUMN_HIGH])?;
            packet[1..].copy_from_slice(&self.buffer[page * WIDTH..(page + 1) * WIDTH]);
            self.i2c.blocking_write(self.address, &packet)?;
        }
        Ok(())
    }

    #[inline]
    fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        color: BinaryColor,
    ) {
        if x >= 0 && x < WIDTH as i32 && y >= 0 && y < HEIGHT as i32 {
            let idx = (y as usize / 8) * WIDTH + x as usize;
            let mask = 1u8 << (y as usize % 8);
            if color.is_on() {
                self.buffer[idx] |= mask;
            } else {
                self.buffer[idx] &= !mask;
            }
        }
    }
}

impl OriginDimensions for Sh1107 {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }
}

impl DrawTarget for Sh1107 {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());
        for point in drawable_area.points() {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.buffer.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

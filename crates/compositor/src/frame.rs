//! The software canvas.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use scenecast_composition_model::Rect;

/// A single RGBA frame.
///
/// Wraps an [`image::RgbaImage`] buffer with the pixel accessors and
/// blit helpers the compositor and offline transforms need.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::from_pixel(width.max(1), height.max(1), Rgba([0, 0, 0, 255]));
        Self { buffer }
    }

    /// Create a frame from an existing buffer.
    pub fn from_image(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a frame from raw RGBA bytes, if the length matches.
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Width / height.
    pub fn aspect(&self) -> f64 {
        self.width() as f64 / self.height().max(1) as f64
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Alpha-blend a color onto one pixel.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let dst = self.buffer.get_pixel_mut(x, y);
        let alpha = color[3] as f32 / 255.0;
        for c in 0..3 {
            let blended = color[c] as f32 * alpha + dst.0[c] as f32 * (1.0 - alpha);
            dst.0[c] = blended.round() as u8;
        }
        dst.0[3] = 255;
    }

    /// Fill the whole frame with one opaque color.
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgba(color);
        }
    }

    /// Fill a pixel rectangle with one opaque color, clipped to bounds.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let (x0, y0, x1, y1) = clip_rect(rect, self.width(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.buffer.put_pixel(x, y, Rgba(color));
            }
        }
    }

    /// Alpha-blend a color over a pixel rectangle, clipped to bounds.
    pub fn blend_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let (x0, y0, x1, y1) = clip_rect(rect, self.width(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Draw another frame scaled into the destination rectangle.
    ///
    /// Negative destination coordinates are allowed (the overlay clips);
    /// a zero-area destination draws nothing.
    pub fn draw_scaled(&mut self, src: &Frame, dest: Rect) {
        let dest_w = dest.w.round() as i64;
        let dest_h = dest.h.round() as i64;
        if dest_w <= 0 || dest_h <= 0 || src.width() == 0 || src.height() == 0 {
            return;
        }

        let scaled = if src.width() as i64 == dest_w && src.height() as i64 == dest_h {
            src.buffer.clone()
        } else {
            imageops::resize(
                &src.buffer,
                dest_w as u32,
                dest_h as u32,
                imageops::FilterType::Triangle,
            )
        };

        imageops::overlay(
            &mut self.buffer,
            &scaled,
            dest.x.round() as i64,
            dest.y.round() as i64,
        );
    }

    /// Copy out a sub-rectangle, clipped to bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        let width = width.min(self.width() - x).max(1);
        let height = height.min(self.height() - y).max(1);
        Frame {
            buffer: imageops::crop_imm(&self.buffer, x, y, width, height).to_image(),
        }
    }

    /// Scale to exact dimensions (no letterboxing).
    pub fn scaled_to(&self, width: u32, height: u32) -> Frame {
        Frame {
            buffer: imageops::resize(
                &self.buffer,
                width.max(1),
                height.max(1),
                imageops::FilterType::Triangle,
            ),
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    /// Raw RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.buffer.as_raw().clone()
    }
}

fn clip_rect(rect: Rect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x0 = rect.x.max(0.0).round() as u32;
    let y0 = rect.y.max(0.0).round() as u32;
    let x1 = rect.right().max(0.0).round().min(width as f64) as u32;
    let y1 = rect.bottom().max(0.0).round().min(height as f64) as u32;
    (x0.min(width), y0.min(height), x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_opaque_black() {
        let frame = Frame::new(4, 4);
        assert_eq!(frame.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(3, 3), [0, 0, 0, 255]);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut frame = Frame::new(8, 8);
        frame.fill_rect(Rect::new(6.0, 6.0, 10.0, 10.0), [255, 0, 0, 255]);
        assert_eq!(frame.get_pixel(7, 7), [255, 0, 0, 255]);
        assert_eq!(frame.get_pixel(5, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn blend_pixel_mixes_colors() {
        let mut frame = Frame::new(2, 2);
        frame.set_pixel(0, 0, [0, 0, 0, 255]);
        frame.blend_pixel(0, 0, [255, 255, 255, 128]);
        let [r, g, b, a] = frame.get_pixel(0, 0);
        assert!(r > 120 && r < 136);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn draw_scaled_fills_destination() {
        let mut canvas = Frame::new(16, 16);
        let mut src = Frame::new(4, 4);
        src.clear([0, 255, 0, 255]);
        canvas.draw_scaled(&src, Rect::new(4.0, 4.0, 8.0, 8.0));
        assert_eq!(canvas.get_pixel(8, 8), [0, 255, 0, 255]);
        assert_eq!(canvas.get_pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn crop_extracts_subregion() {
        let mut frame = Frame::new(8, 8);
        frame.fill_rect(Rect::new(4.0, 0.0, 4.0, 8.0), [0, 0, 255, 255]);
        let cropped = frame.crop(4, 0, 4, 8);
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.get_pixel(0, 0), [0, 0, 255, 255]);
    }
}

//! Pure per-frame redaction transforms.

use scenecast_compositor::Frame;

/// A pixel-space rectangle within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fill the top `crop_line_pct` percent of the frame with solid black.
///
/// Rows with index `< crop_line_pct/100 * height` are blacked out; all
/// other rows are left byte-identical.
pub fn apply_crop_band(frame: &mut Frame, crop_line_pct: f64) {
    let threshold = crop_line_pct.clamp(0.0, 100.0) / 100.0 * frame.height() as f64;
    let width = frame.width();
    for y in 0..frame.height() {
        if (y as f64) >= threshold {
            break;
        }
        for x in 0..width {
            frame.set_pixel(x, y, [0, 0, 0, 255]);
        }
    }
}

/// Pixelate a region with `block_size`-square mosaic blocks.
///
/// Each block is overwritten with the color sampled at its own center
/// pixel (nearest-neighbor, not an average), covering
/// `ceil(W/B) * ceil(H/B)` blocks. Partial blocks at the region edge
/// sample the center of what remains.
pub fn apply_mosaic(frame: &mut Frame, region: PixelRegion, block_size: u32) {
    let block = block_size.max(1);

    let x0 = region.x.min(frame.width());
    let y0 = region.y.min(frame.height());
    let x1 = region.x.saturating_add(region.width).min(frame.width());
    let y1 = region.y.saturating_add(region.height).min(frame.height());
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let mut by = y0;
    while by < y1 {
        let block_h = block.min(y1 - by);
        let mut bx = x0;
        while bx < x1 {
            let block_w = block.min(x1 - bx);
            // Sample before overwriting; the center pixel belongs to this
            // block, which has not been written yet.
            let color = frame.get_pixel(bx + block_w / 2, by + block_h / 2);
            for y in by..by + block_h {
                for x in bx..bx + block_w {
                    frame.set_pixel(x, y, color);
                }
            }
            bx += block;
        }
        by += block;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A frame whose every pixel encodes its own coordinates.
    fn coordinate_frame(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [x as u8, y as u8, 7, 255]);
            }
        }
        frame
    }

    #[test]
    fn crop_band_blacks_exact_row_range() {
        let mut frame = coordinate_frame(16, 100);
        let original = frame.clone();
        apply_crop_band(&mut frame, 30.0);

        for y in 0..100 {
            for x in 0..16 {
                if y < 30 {
                    assert_eq!(frame.get_pixel(x, y), [0, 0, 0, 255], "row {y}");
                } else {
                    assert_eq!(frame.get_pixel(x, y), original.get_pixel(x, y), "row {y}");
                }
            }
        }
    }

    #[test]
    fn crop_band_extremes() {
        let mut untouched = coordinate_frame(8, 8);
        let original = untouched.clone();
        apply_crop_band(&mut untouched, 0.0);
        assert_eq!(untouched.to_rgba_bytes(), original.to_rgba_bytes());

        let mut blacked = coordinate_frame(8, 8);
        apply_crop_band(&mut blacked, 100.0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(blacked.get_pixel(x, y), [0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn mosaic_blocks_take_their_center_color() {
        let mut frame = coordinate_frame(16, 16);
        let original = frame.clone();
        let region = PixelRegion {
            x: 0,
            y: 0,
            width: 16,
            height: 16,
        };
        apply_mosaic(&mut frame, region, 4);

        for by in 0..4u32 {
            for bx in 0..4u32 {
                let center = original.get_pixel(bx * 4 + 2, by * 4 + 2);
                for y in by * 4..by * 4 + 4 {
                    for x in bx * 4..bx * 4 + 4 {
                        assert_eq!(frame.get_pixel(x, y), center, "block ({bx},{by})");
                    }
                }
            }
        }
    }

    #[test]
    fn mosaic_partial_edge_blocks_sample_remaining_center() {
        let mut frame = coordinate_frame(10, 6);
        let original = frame.clone();
        apply_mosaic(
            &mut frame,
            PixelRegion {
                x: 0,
                y: 0,
                width: 10,
                height: 6,
            },
            4,
        );

        // ceil(10/4) x ceil(6/4) = 3 x 2 blocks; the right column is
        // 2 wide and the bottom row 2 tall.
        let edge_center = original.get_pixel(8 + 1, 4 + 1);
        assert_eq!(frame.get_pixel(9, 5), edge_center);
        assert_eq!(frame.get_pixel(8, 4), edge_center);

        let first_center = original.get_pixel(2, 2);
        assert_eq!(frame.get_pixel(0, 0), first_center);
    }

    #[test]
    fn mosaic_leaves_pixels_outside_region_alone() {
        let mut frame = coordinate_frame(16, 16);
        let original = frame.clone();
        apply_mosaic(
            &mut frame,
            PixelRegion {
                x: 4,
                y: 4,
                width: 8,
                height: 8,
            },
            4,
        );

        assert_eq!(frame.get_pixel(0, 0), original.get_pixel(0, 0));
        assert_eq!(frame.get_pixel(15, 15), original.get_pixel(15, 15));
        assert_eq!(frame.get_pixel(3, 8), original.get_pixel(3, 8));
    }

    #[test]
    fn mosaic_region_is_clipped_to_frame() {
        let mut frame = coordinate_frame(8, 8);
        apply_mosaic(
            &mut frame,
            PixelRegion {
                x: 4,
                y: 4,
                width: 100,
                height: 100,
            },
            8,
        );
        // Out-of-bounds region clamps; no panic and the clamped block is
        // uniform.
        let color = frame.get_pixel(4, 4);
        assert_eq!(frame.get_pixel(7, 7), color);
    }
}

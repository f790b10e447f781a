//! Pixel conversions between sensor planes and render-ready buffers.

use image::{Rgba, RgbaImage};

use super::frame::DepthMap;

/// Turbo colormap: perceptually uniform rainbow (blue=near, red=far)
///
/// Based on the Google Turbo colormap.
fn turbo(t: f32) -> [u8; 3] {
    let r = (0.13572138
        + t * (4.6153926 + t * (-42.66032 + t * (132.13108 + t * (-152.54825 + t * 59.28144)))))
        .clamp(0.0, 1.0);
    let g = (0.09140261
        + t * (2.19418 + t * (4.84296 + t * (-14.18503 + t * (4.27805 + t * 2.53377)))))
        .clamp(0.0, 1.0);
    let b = (0.1066733
        + t * (12.64194 + t * (-60.58204 + t * (109.99648 + t * (-82.52904 + t * 20.43388)))))
        .clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// False-color a depth map over a fixed metric range.
///
/// Unreadable samples (raw value 0) come out black. Output is RGB8 in the
/// same top-down row order as the input grid.
pub fn depth_to_rgb(depth: &DepthMap, depth_scale: f32, near_m: f32, far_m: f32) -> Vec<u8> {
    let range = (far_m - near_m).max(f32::EPSILON);
    let mut rgb = Vec::with_capacity(depth.data.len() * 3);

    for &raw in &depth.data {
        if raw == 0 {
            rgb.extend_from_slice(&[0, 0, 0]);
        } else {
            let t = ((raw as f32 * depth_scale - near_m) / range).clamp(0.0, 1.0);
            rgb.extend_from_slice(&turbo(t));
        }
    }

    rgb
}

/// Attach an opaque alpha to a paletted RGB buffer, one `[u8; 4]` per point.
pub fn point_colors(rgb: &[u8]) -> Vec<[u8; 4]> {
    rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2], 255]).collect()
}

/// Repack an RGB8 top-down buffer as a bottom-up RGBA image for the
/// GL-style consumer.
pub fn render_ready(rgb: &[u8], width: u32, height: u32) -> RgbaImage {
    debug_assert_eq!(rgb.len(), (width * height * 3) as usize);

    RgbaImage::from_fn(width, height, |x, y| {
        let src_y = height - 1 - y;
        let i = ((src_y * width + x) * 3) as usize;
        Rgba([rgb[i], rgb[i + 1], rgb[i + 2], 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turbo_palette_spans_the_range() {
        let near = turbo(0.0);
        let far = turbo(1.0);

        // Blue-dominant near, red-dominant far.
        assert!(near[2] > near[0]);
        assert!(far[0] > far[2]);
    }

    #[test]
    fn invalid_depth_renders_black() {
        let depth = DepthMap {
            data: vec![0, 2000],
            width: 2,
            height: 1,
        };

        let rgb = depth_to_rgb(&depth, 0.001, 0.3, 6.0);
        assert_eq!(&rgb[0..3], &[0, 0, 0]);
        assert_ne!(&rgb[3..6], &[0, 0, 0]);
    }

    #[test]
    fn depth_palette_is_monotone_in_distance() {
        let depth = DepthMap {
            data: vec![500, 3000, 5500],
            width: 3,
            height: 1,
        };

        let rgb = depth_to_rgb(&depth, 0.001, 0.3, 6.0);
        // Closer sample is bluer, farther sample is redder.
        assert!(rgb[2] > rgb[8]);
        assert!(rgb[6] > rgb[0]);
    }

    #[test]
    fn render_ready_flips_rows_and_adds_alpha() {
        // 1x2 image: red on top, green below.
        let rgb = [255u8, 0, 0, 0, 255, 0];
        let img = render_ready(&rgb, 1, 2);

        assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn point_colors_are_opaque() {
        let colors = point_colors(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(colors, vec![[1, 2, 3, 255], [4, 5, 6, 255]]);
    }
}

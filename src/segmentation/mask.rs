//! Polygon rasterization and area-weighted moments.

/// Raster a closed polygon into a 0/1 mask using even-odd scanline fill.
///
/// Vertices are in pixel coordinates; a pixel is inside when its center is.
pub(crate) fn fill_polygon(polygon: &[(f32, f32)], width: u32, height: u32) -> Vec<u8> {
    let mut mask = vec![0u8; (width * height) as usize];
    if polygon.len() < 3 {
        return mask;
    }

    let mut crossings: Vec<f32> = Vec::new();
    for y in 0..height {
        let yc = y as f32 + 0.5;

        crossings.clear();
        for i in 0..polygon.len() {
            let (x0, y0) = polygon[i];
            let (x1, y1) = polygon[(i + 1) % polygon.len()];
            if (y0 <= yc && y1 > yc) || (y1 <= yc && y0 > yc) {
                crossings.push(x0 + (yc - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            // Pixel centers inside [span start, span end).
            let start = (span[0] - 0.5).ceil().max(0.0) as u32;
            let end = ((span[1] - 0.5).floor().min(width as f32 - 1.0)) as i64;
            for x in start as i64..=end {
                mask[(y * width) as usize + x as usize] = 1;
            }
        }
    }

    mask
}

/// Area-weighted polygon moments via Green's theorem, the same quantities a
/// classic image-moment computation yields for a filled contour.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

pub(crate) fn polygon_moments(polygon: &[(f32, f32)]) -> Moments {
    let mut m = Moments {
        m00: 0.0,
        m10: 0.0,
        m01: 0.0,
    };

    for i in 0..polygon.len() {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % polygon.len()];
        let cross = (x0 as f64) * (y1 as f64) - (x1 as f64) * (y0 as f64);
        m.m00 += cross;
        m.m10 += (x0 as f64 + x1 as f64) * cross;
        m.m01 += (y0 as f64 + y1 as f64) * cross;
    }

    m.m00 /= 2.0;
    m.m10 /= 6.0;
    m.m01 /= 6.0;
    m
}

/// Centroid pixel of a polygon, or `None` for degenerate (zero-area) ones.
pub(crate) fn centroid(polygon: &[(f32, f32)]) -> Option<(u32, u32)> {
    if polygon.len() < 3 {
        return None;
    }

    let m = polygon_moments(polygon);
    if m.m00.abs() < f64::EPSILON {
        return None;
    }

    let cx = m.m10 / m.m00;
    let cy = m.m01 / m.m00;
    Some((cx.max(0.0) as u32, cy.max(0.0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(f32, f32)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    #[test]
    fn rectangle_centroid_is_the_geometric_center() {
        assert_eq!(centroid(&rect(10.0, 10.0, 20.0, 20.0)), Some((15, 15)));
    }

    #[test]
    fn winding_direction_does_not_change_the_centroid() {
        let mut reversed = rect(10.0, 10.0, 20.0, 20.0);
        reversed.reverse();
        assert_eq!(centroid(&reversed), Some((15, 15)));
    }

    #[test]
    fn degenerate_polygons_have_no_centroid() {
        // Collinear points enclose no area.
        assert_eq!(centroid(&[(5.0, 5.0), (10.0, 5.0), (15.0, 5.0)]), None);
        assert_eq!(centroid(&[(5.0, 5.0), (10.0, 5.0)]), None);
    }

    #[test]
    fn fill_covers_the_rectangle_interior() {
        let mask = fill_polygon(&rect(2.0, 2.0, 6.0, 6.0), 8, 8);

        let count: u32 = mask.iter().map(|&v| v as u32).sum();
        assert_eq!(count, 16);

        assert_eq!(mask[3 * 8 + 3], 1);
        assert_eq!(mask[1 * 8 + 3], 0);
        assert_eq!(mask[3 * 8 + 6], 0);
    }

    #[test]
    fn fill_clips_to_the_image_bounds() {
        let mask = fill_polygon(&rect(-4.0, -4.0, 3.0, 3.0), 8, 8);

        assert_eq!(mask[0], 1);
        let count: u32 = mask.iter().map(|&v| v as u32).sum();
        assert_eq!(count, 9);
    }

    #[test]
    fn fill_of_degenerate_polygon_is_empty() {
        let mask = fill_polygon(&[(1.0, 1.0), (5.0, 5.0)], 8, 8);
        assert!(mask.iter().all(|&v| v == 0));
    }
}

//! Optional median denoise applied before HSV conversion.
//!
//! Each channel is filtered independently over a square window. Window
//! positions outside the raster are clamped to the nearest edge pixel.

use image::RgbImage;

/// Median-filter `raster` with a `size` x `size` window. Sizes below 3 return
/// an unchanged copy.
pub fn median_filter(raster: &RgbImage, size: u32) -> RgbImage {
    if size < 3 {
        return raster.clone();
    }
    let (width, height) = raster.dimensions();
    let radius = i64::from(size / 2);
    let (max_x, max_y) = (i64::from(width) - 1, i64::from(height) - 1);
    let mut window: [Vec<u8>; 3] = std::array::from_fn(|_| Vec::with_capacity((size * size) as usize));

    RgbImage::from_fn(width, height, |x, y| {
        for channel in &mut window {
            channel.clear();
        }
        for dy in -radius..=radius {
            let sy = (i64::from(y) + dy).clamp(0, max_y) as u32;
            for dx in -radius..=radius {
                let sx = (i64::from(x) + dx).clamp(0, max_x) as u32;
                let px = raster.get_pixel(sx, sy);
                for (channel, value) in window.iter_mut().zip(px.0) {
                    channel.push(value);
                }
            }
        }
        image::Rgb(window.each_mut().map(|channel| {
            channel.sort_unstable();
            channel[channel.len() / 2]
        }))
    })
}

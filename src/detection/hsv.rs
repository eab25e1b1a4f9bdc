//! RGB to HSV conversion and the rust-color band.
//!
//! Uses the 8-bit convention: hue in 0..=179 (degrees / 2), saturation and
//! value in 0..=255.

use image::RgbImage;

use crate::config::DetectionConfig;

use super::morphology::BinaryMask;

/// One pixel in 8-bit HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let delta = max - min;

        let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

        let degrees = if delta <= 0.0 {
            0.0
        } else if (max - rf).abs() < f64::EPSILON {
            60.0 * (gf - bf) / delta
        } else if (max - gf).abs() < f64::EPSILON {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };

        // 359.5 degrees rounds to 180, which wraps back to red
        let h = ((degrees / 2.0).round() as u32 % 180) as u8;

        Self {
            h,
            s: s.round().clamp(0.0, 255.0) as u8,
            v: max as u8,
        }
    }

    /// Rust-signal intensity in [0, 1]: saturated and dark pixels score high.
    pub fn rust_signal(&self) -> f64 {
        0.5 * f64::from(self.s) / 255.0 + 0.5 * (1.0 - f64::from(self.v) / 255.0)
    }
}

/// Row-major HSV raster.
#[derive(Debug, Clone)]
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<Hsv>,
}

impl HsvImage {
    pub fn from_rgb(raster: &RgbImage) -> Self {
        let pixels = raster
            .pixels()
            .map(|p| Hsv::from_rgb(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self {
            width: raster.width(),
            height: raster.height(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Hsv {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }
}

/// Inclusive min/max band in each HSV channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBand {
    pub hue: (u8, u8),
    pub saturation: (u8, u8),
    pub value: (u8, u8),
}

impl ColorBand {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            hue: (config.hue_min, config.hue_max),
            saturation: (config.saturation_min, config.saturation_max),
            value: (config.value_min, config.value_max),
        }
    }

    pub fn contains(&self, px: Hsv) -> bool {
        (self.hue.0..=self.hue.1).contains(&px.h)
            && (self.saturation.0..=self.saturation.1).contains(&px.s)
            && (self.value.0..=self.value.1).contains(&px.v)
    }

    /// Binary mask of pixels inside the band.
    pub fn threshold(&self, hsv: &HsvImage) -> BinaryMask {
        BinaryMask::from_fn(hsv.width(), hsv.height(), |x, y| self.contains(hsv.get(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(Hsv::from_rgb(0, 255, 0).h, 60);
        assert_eq!(Hsv::from_rgb(0, 0, 255).h, 120);
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let px = Hsv::from_rgb(128, 128, 128);
        assert_eq!(px.s, 0);
        assert_eq!(px.h, 0);
        assert_eq!(px.v, 128);
    }

    #[test]
    fn test_rust_orange_falls_in_default_band() {
        let band = ColorBand::from_config(&DetectionConfig::default());
        let rust = Hsv::from_rgb(170, 85, 40);
        assert_eq!(rust.h, 10);
        assert!(band.contains(rust));
        assert!(!band.contains(Hsv::from_rgb(40, 80, 200)));
        assert!(!band.contains(Hsv::from_rgb(128, 128, 128)));
    }

    #[test]
    fn test_near_360_wraps_to_red() {
        // hue just below 360 degrees
        let px = Hsv::from_rgb(255, 0, 1);
        assert!(px.h == 0 || px.h == 179);
    }

    #[test]
    fn test_rust_signal_increases_with_darkness() {
        let bright = Hsv { h: 10, s: 200, v: 220 };
        let dark = Hsv { h: 10, s: 200, v: 90 };
        assert!(dark.rust_signal() > bright.rust_signal());
        assert!((0.0..=1.0).contains(&dark.rust_signal()));
    }
}

//! Binary masks and square-kernel morphology.
//!
//! Erosion and dilation are separable for a square structuring element, so
//! each runs as a horizontal pass followed by a vertical pass. Neighbours
//! outside the raster are ignored rather than treated as background.

/// Row-major boolean raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

impl Op {
    fn reduce(self, mut window: impl Iterator<Item = bool>) -> bool {
        match self {
            Op::Erode => window.all(|v| v),
            Op::Dilate => window.any(|v| v),
        }
    }
}

fn separable(mask: &BinaryMask, kernel_size: u32, op: Op) -> BinaryMask {
    let radius = kernel_size / 2;
    if radius == 0 || mask.pixel_count() == 0 {
        return mask.clone();
    }
    let (w, h) = (mask.width, mask.height);

    let horizontal = BinaryMask::from_fn(w, h, |x, y| {
        let lo = x.saturating_sub(radius);
        let hi = (x + radius).min(w - 1);
        op.reduce((lo..=hi).map(|nx| mask.get(nx, y)))
    });

    BinaryMask::from_fn(w, h, |x, y| {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(h - 1);
        op.reduce((lo..=hi).map(|ny| horizontal.get(x, ny)))
    })
}

pub fn erode(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    separable(mask, kernel_size, Op::Erode)
}

pub fn dilate(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    separable(mask, kernel_size, Op::Dilate)
}

/// Erode then dilate: removes speckle smaller than the kernel.
pub fn open(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    dilate(&erode(mask, kernel_size), kernel_size)
}

/// Dilate then erode: fills gaps smaller than the kernel.
pub fn close(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    erode(&dilate(mask, kernel_size), kernel_size)
}

/// Opening followed by closing. The order matters: isolated false positives
/// must be gone before closing reconnects split regions.
pub fn clean(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    close(&open(mask, kernel_size), kernel_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> BinaryMask {
        BinaryMask::from_fn(w, h, |x, y| (x0..x1).contains(&x) && (y0..y1).contains(&y))
    }

    #[test]
    fn test_open_removes_speckle() {
        let mut mask = rect(20, 20, 5, 5, 15, 15);
        mask.set(1, 1, true);
        mask.set(18, 2, true);
        let opened = open(&mask, 3);
        assert!(!opened.get(1, 1));
        assert!(!opened.get(18, 2));
        assert_eq!(opened.count(), 100);
    }

    #[test]
    fn test_close_fills_small_gap() {
        let mut mask = rect(20, 20, 2, 2, 18, 10);
        mask.set(10, 5, false);
        let closed = close(&mask, 3);
        assert!(closed.get(10, 5));
    }

    #[test]
    fn test_clean_orders_open_before_close() {
        // Two 2-px-wide slivers one column apart: closing first merges them
        // into a 5x3 bar that survives opening; opening first drops both.
        let a = rect(12, 12, 2, 2, 4, 5);
        let b = rect(12, 12, 5, 2, 7, 5);
        let mask = BinaryMask::from_fn(12, 12, |x, y| a.get(x, y) || b.get(x, y));
        let cleaned = clean(&mask, 3);
        assert_eq!(cleaned.count(), 0);
        let reversed = open(&close(&mask, 3), 3);
        assert_eq!(reversed.count(), 15);
    }

    #[test]
    fn test_border_region_survives_erosion() {
        let mask = rect(10, 10, 0, 0, 4, 4);
        let eroded = erode(&mask, 3);
        assert!(eroded.get(0, 0));
        assert!(!eroded.get(3, 3));
    }

    #[test]
    fn test_kernel_size_one_is_identity() {
        let mask = rect(8, 8, 2, 2, 5, 5);
        assert_eq!(clean(&mask, 1), mask);
    }
}

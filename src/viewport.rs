//! The resize policy: backing resolution vs. displayed size.
//!
//! The drawable surface has two sizes: the logical size it is laid out at,
//! and the backing-buffer resolution actually rendered into. The policy
//! compares them once per frame, before rendering, and only then touches the
//! renderer and camera projections.

/// Pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Backing resolution wanted for a surface displayed at `logical_size` on a
/// display with the given pixel density. Fractional pixels are floored, as
/// the drawing buffer cannot be fractional.
pub fn desired_resolution(logical_size: (u32, u32), pixel_ratio: f64) -> Resolution {
    Resolution {
        width: (logical_size.0 as f64 * pixel_ratio).floor() as u32,
        height: (logical_size.1 as f64 * pixel_ratio).floor() as u32,
    }
}

/// True exactly when the backing buffer no longer matches the desired
/// resolution. Pure comparison; the caller decides what to do about it.
pub fn needs_resize(backing: Resolution, desired: Resolution) -> bool {
    backing.width != desired.width || backing.height != desired.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differing_resolutions_need_resize() {
        // the canvas default backing vs. a doubled display size
        assert!(needs_resize(
            Resolution::new(300, 150),
            Resolution::new(600, 300)
        ));
    }

    #[test]
    fn equal_resolutions_do_not() {
        assert!(!needs_resize(
            Resolution::new(600, 300),
            Resolution::new(600, 300)
        ));
    }

    #[test]
    fn single_axis_difference_is_enough() {
        assert!(needs_resize(
            Resolution::new(600, 150),
            Resolution::new(600, 300)
        ));
        assert!(needs_resize(
            Resolution::new(300, 300),
            Resolution::new(600, 300)
        ));
    }

    #[test]
    fn hidpi_scaling_floors() {
        let desired = desired_resolution((301, 151), 1.5);
        assert_eq!(desired, Resolution::new(451, 226));
    }

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(Resolution::new(600, 300).aspect(), 2.0);
        assert_eq!(Resolution::new(600, 0).aspect(), 1.0);
    }
}

use crate::api::frame::*;

use std::mem;

/// Plane-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneConfig {
    /// Data stride.
    pub stride: usize,
    /// Allocated height in pixels.
    pub alloc_height: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Decimator along the X axis.
    ///
    /// For example, for chroma planes in a 4:2:0 configuration this would be 1.
    pub xdec: usize,
    /// Decimator along the Y axis.
    pub ydec: usize,
    /// Number of padding pixels on the right.
    pub xpad: usize,
    /// Number of padding pixels on the bottom.
    pub ypad: usize,
    /// X where the data starts.
    pub xorigin: usize,
    /// Y where the data starts.
    pub yorigin: usize,
}

impl PlaneConfig {
    /// Stride alignment in bytes.
    const STRIDE_ALIGNMENT_LOG2: usize = 5;

    #[inline]
    pub fn new(
        width: usize,
        height: usize,
        xdec: usize,
        ydec: usize,
        xpad: usize,
        ypad: usize,
        type_size: usize,
    ) -> Self {
        let xorigin = xpad.align_power_of_two(Self::STRIDE_ALIGNMENT_LOG2 + 1 - type_size);
        let yorigin = ypad;
        let stride = (xorigin + width + xpad)
            .align_power_of_two(Self::STRIDE_ALIGNMENT_LOG2 + 1 - type_size);
        let alloc_height = yorigin + height + ypad;

        PlaneConfig {
            stride,
            alloc_height,
            width,
            height,
            xdec,
            ydec,
            xpad,
            ypad,
            xorigin,
            yorigin,
        }
    }
}

/// One data plane of a frame.
///
/// For example, a plane can be a Y luma plane or a U or V chroma plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T: Pixel> {
    pub data: AlignedBoxedSlice<T>,
    pub cfg: PlaneConfig,
}

impl<T: Pixel> Plane<T> {
    /// Allocates and returns a new plane filled with mid-grey.
    pub fn new(
        width: usize,
        height: usize,
        xdec: usize,
        ydec: usize,
        xpad: usize,
        ypad: usize,
    ) -> Self {
        let cfg = PlaneConfig::new(width, height, xdec, ydec, xpad, ypad, mem::size_of::<T>());
        let data = AlignedBoxedSlice::new(cfg.stride * cfg.alloc_height, T::cast_from(128u8));

        Plane { data, cfg }
    }

    /// Wraps a tightly packed buffer of `stride`-wide rows.
    pub fn from_slice(data: &[T], stride: usize) -> Self {
        let len = data.len();
        let height = if stride == 0 { 0 } else { len / stride };

        Self {
            data: AlignedBoxedSlice::from_slice(&data[..height * stride]),
            cfg: PlaneConfig {
                stride,
                alloc_height: height,
                width: stride,
                height,
                xdec: 0,
                ydec: 0,
                xpad: 0,
                ypad: 0,
                xorigin: 0,
                yorigin: 0,
            },
        }
    }

    /// Index of the sample at (x, y) relative to the visible origin.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        (self.cfg.yorigin + y) * self.cfg.stride + self.cfg.xorigin + x
    }

    #[inline]
    pub fn p(&self, x: usize, y: usize) -> T {
        self.data[self.offset(x, y)]
    }

    pub fn data_origin(&self) -> &[T] {
        let o = self.offset(0, 0);
        &self.data[o..]
    }

    pub fn data_origin_mut(&mut self) -> &mut [T] {
        let o = self.offset(0, 0);
        &mut self.data[o..]
    }

    /// Visible part of row `y`.
    pub fn row(&self, y: usize) -> &[T] {
        let o = self.offset(0, y);
        &self.data[o..o + self.cfg.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let o = self.offset(0, y);
        let w = self.cfg.width;
        &mut self.data[o..o + w]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[T]> {
        (0..self.cfg.height).map(move |y| self.row(y))
    }

    /// Replicates the outermost visible samples into the padding.
    pub fn pad(&mut self) {
        let xorigin = self.cfg.xorigin;
        let yorigin = self.cfg.yorigin;
        let stride = self.cfg.stride;
        let alloc_height = self.cfg.alloc_height;
        let width = self.cfg.width;
        let height = self.cfg.height;
        if width == 0 || height == 0 {
            return;
        }

        if xorigin > 0 {
            for y in 0..height {
                let base = (yorigin + y) * stride;
                let fill_val = self.data[base + xorigin];
                for val in &mut self.data[base..base + xorigin] {
                    *val = fill_val;
                }
            }
        }

        if xorigin + width < stride {
            for y in 0..height {
                let base = (yorigin + y) * stride + xorigin + width;
                let fill_val = self.data[base - 1];
                for val in &mut self.data[base..base + stride - (xorigin + width)] {
                    *val = fill_val;
                }
            }
        }

        if yorigin > 0 {
            let (top, bottom) = self.data.split_at_mut(yorigin * stride);
            let src = &bottom[..stride];
            for y in 0..yorigin {
                let dst = &mut top[y * stride..(y + 1) * stride];
                dst.copy_from_slice(src);
            }
        }

        if yorigin + height < alloc_height {
            let (top, bottom) = self.data.split_at_mut((yorigin + height) * stride);
            let src = &top[(yorigin + height - 1) * stride..];
            for y in 0..alloc_height - (yorigin + height) {
                let dst = &mut bottom[y * stride..(y + 1) * stride];
                dst.copy_from_slice(src);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_slice_is_tight() {
        let data: Vec<u8> = (0..24).collect();
        let plane = Plane::from_slice(&data, 6);
        assert_eq!(plane.cfg.width, 6);
        assert_eq!(plane.cfg.height, 4);
        assert_eq!(plane.p(2, 3), 20);
        assert_eq!(plane.row(1), &[6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn padded_origin() {
        let mut plane = Plane::<u16>::new(8, 4, 0, 0, 8, 2);
        assert!(plane.cfg.xorigin >= 8);
        assert_eq!(plane.cfg.yorigin, 2);
        plane.row_mut(0)[0] = 7;
        assert_eq!(plane.data_origin()[0], 7);
    }

    #[test]
    fn pad_replicates_edges() {
        let mut plane = Plane::<u8>::new(4, 2, 0, 0, 4, 1);
        for y in 0..2 {
            for (x, v) in plane.row_mut(y).iter_mut().enumerate() {
                *v = (y * 4 + x) as u8;
            }
        }
        plane.pad();
        let stride = plane.cfg.stride;
        let o = plane.offset(0, 0);
        assert_eq!(plane.data[o - 1], 0);
        assert_eq!(plane.data[o + 4], 3);
        assert_eq!(plane.data[o - stride], 0);
        assert_eq!(plane.data[o + 2 * stride + 3], 7);
    }
}

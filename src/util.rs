use crate::api::frame::*;

/* clipping within min and max */
#[inline]
pub(crate) fn EVC_CLIP3<T: PartialOrd>(min_x: T, max_x: T, value: T) -> T {
    if value < min_x {
        min_x
    } else if value > max_x {
        max_x
    } else {
        value
    }
}

/* -1, 0 or 1 */
#[inline]
pub(crate) fn EVC_SIGN3(v: i32) -> i32 {
    (v > 0) as i32 - (v < 0) as i32
}

/* copy a w x h block between two strided buffers */
pub(crate) fn pixels_blit<T: Pixel>(
    src: &[T],
    src_stride: usize,
    dst: &mut [T],
    dst_stride: usize,
    width: usize,
    height: usize,
) {
    if width == 0 {
        return;
    }
    for (s, d) in src
        .chunks(src_stride)
        .zip(dst.chunks_mut(dst_stride))
        .take(height)
    {
        d[..width].copy_from_slice(&s[..width]);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clip3_bounds() {
        assert_eq!(EVC_CLIP3(0, 255, -3), 0);
        assert_eq!(EVC_CLIP3(0, 255, 300), 255);
        assert_eq!(EVC_CLIP3(0, 255, 17), 17);
    }

    #[test]
    fn sign3_values() {
        assert_eq!(EVC_SIGN3(-40), -1);
        assert_eq!(EVC_SIGN3(0), 0);
        assert_eq!(EVC_SIGN3(9), 1);
    }

    #[test]
    fn blit_between_strides() {
        let src: Vec<u8> = (0..40).collect();
        let mut dst = vec![0u8; 3 * 4];
        pixels_blit(&src, 10, &mut dst, 4, 3, 3);
        assert_eq!(dst, vec![0, 1, 2, 0, 10, 11, 12, 0, 20, 21, 22, 0]);
    }
}

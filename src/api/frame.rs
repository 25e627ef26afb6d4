use super::*;
use crate::def::*;
use crate::plane::*;

use num_traits::*;

use std::fmt;

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::fmt::{Debug, Display};
use std::{mem, ptr};

/// An analog to a Box<[T]> where the underlying slice is aligned.
/// Alignment is according to the architecture-specific SIMD constraints.
pub struct AlignedBoxedSlice<T> {
    ptr: std::ptr::NonNull<T>,
    len: usize,
}

impl<T> AlignedBoxedSlice<T> {
    // Data alignment in bytes.
    cfg_if::cfg_if! {
      if #[cfg(target_arch = "wasm32")] {
        // FIXME: wasm32 allocator fails for alignment larger than 3
        const DATA_ALIGNMENT_LOG2: usize = 3;
      } else {
        const DATA_ALIGNMENT_LOG2: usize = 5;
      }
    }

    unsafe fn layout(len: usize) -> Layout {
        Layout::from_size_align_unchecked(len * mem::size_of::<T>(), 1 << Self::DATA_ALIGNMENT_LOG2)
    }

    unsafe fn alloc(len: usize) -> std::ptr::NonNull<T> {
        if len == 0 || mem::size_of::<T>() == 0 {
            return ptr::NonNull::dangling();
        }
        let layout = Self::layout(len);
        match ptr::NonNull::new(alloc(layout) as *mut T) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        }
    }

    /// Creates a ['AlignedBoxedSlice'] with a slice of length ['len'] filled with
    /// ['val'].
    pub fn new(len: usize, val: T) -> Self
    where
        T: Clone,
    {
        let ptr = unsafe { Self::alloc(len) };
        for i in 0..len {
            unsafe { ptr::write(ptr.as_ptr().add(i), val.clone()) };
        }

        Self { ptr, len }
    }

    pub fn from_slice(data: &[T]) -> Self
    where
        T: Copy,
    {
        let ptr = unsafe { Self::alloc(data.len()) };
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), ptr.as_ptr(), data.len()) };

        Self {
            ptr,
            len: data.len(),
        }
    }
}

impl<T: Copy> Clone for AlignedBoxedSlice<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedBoxedSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: PartialEq> PartialEq for AlignedBoxedSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T> std::ops::Deref for AlignedBoxedSlice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe {
            let p = self.ptr.as_ptr();

            std::slice::from_raw_parts(p, self.len)
        }
    }
}

impl<T> std::ops::DerefMut for AlignedBoxedSlice<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe {
            let p = self.ptr.as_ptr();

            std::slice::from_raw_parts_mut(p, self.len)
        }
    }
}

impl<T> std::ops::Drop for AlignedBoxedSlice<T> {
    fn drop(&mut self) {
        unsafe {
            for a in self.iter_mut() {
                ptr::drop_in_place(a)
            }

            if self.len != 0 && mem::size_of::<T>() != 0 {
                dealloc(self.ptr.as_ptr() as *mut u8, Self::layout(self.len));
            }
        }
    }
}

unsafe impl<T> Send for AlignedBoxedSlice<T> where T: Send {}
unsafe impl<T> Sync for AlignedBoxedSlice<T> where T: Sync {}

pub trait Fixed {
    fn floor_log2(&self, n: usize) -> usize;
    fn ceil_log2(&self, n: usize) -> usize;
    fn align_power_of_two(&self, n: usize) -> usize;
}

impl Fixed for usize {
    #[inline]
    fn floor_log2(&self, n: usize) -> usize {
        self & !((1 << n) - 1)
    }
    #[inline]
    fn ceil_log2(&self, n: usize) -> usize {
        (self + (1 << n) - 1).floor_log2(n)
    }
    #[inline]
    fn align_power_of_two(&self, n: usize) -> usize {
        self.ceil_log2(n)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub trait CastFromPrimitive<T>: Copy + 'static {
    fn cast_from(v: T) -> Self;
}

macro_rules! impl_cast_from_primitive {
  ( $T:ty => $U:ty ) => {
    impl CastFromPrimitive<$U> for $T {
      #[inline(always)]
      fn cast_from(v: $U) -> Self { v as Self }
    }
  };
  ( $T:ty => { $( $U:ty ),* } ) => {
    $( impl_cast_from_primitive!($T => $U); )*
  };
}

// casts to { u8, u16 } are implemented separately using Pixel, so that the
// compiler understands that CastFromPrimitive<T: Pixel> is always implemented
impl_cast_from_primitive!(u8 => { u32, u64, usize });
impl_cast_from_primitive!(u8 => { i8, i16, i32, i64, isize });
impl_cast_from_primitive!(u16 => { u32, u64, usize });
impl_cast_from_primitive!(u16 => { i8, i16, i32, i64, isize });
impl_cast_from_primitive!(i32 => { u32, u64, usize });
impl_cast_from_primitive!(i32 => { i8, i16, i32, i64, isize });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    U8,
    U16,
}

pub trait Pixel:
    PrimInt
    + Into<u32>
    + Into<i32>
    + AsPrimitive<u8>
    + AsPrimitive<i16>
    + AsPrimitive<u16>
    + AsPrimitive<i32>
    + AsPrimitive<u32>
    + AsPrimitive<usize>
    + CastFromPrimitive<u8>
    + CastFromPrimitive<i16>
    + CastFromPrimitive<u16>
    + CastFromPrimitive<i32>
    + CastFromPrimitive<u32>
    + CastFromPrimitive<usize>
    + Debug
    + Display
    + Send
    + Sync
    + 'static
{
    fn type_enum() -> PixelType;

    /* widest sample value this storage type can hold */
    fn max_bit_depth() -> usize {
        mem::size_of::<Self>() * 8
    }
}

impl Pixel for u8 {
    fn type_enum() -> PixelType {
        PixelType::U8
    }
}
impl Pixel for u16 {
    fn type_enum() -> PixelType {
        PixelType::U16
    }
}

macro_rules! impl_cast_from_pixel_to_primitive {
    ( $T:ty ) => {
        impl<T: Pixel> CastFromPrimitive<T> for $T {
            #[inline(always)]
            fn cast_from(v: T) -> Self {
                v.as_()
            }
        }
    };
}

impl_cast_from_pixel_to_primitive!(u8);
impl_cast_from_pixel_to_primitive!(i16);
impl_cast_from_pixel_to_primitive!(u16);
impl_cast_from_pixel_to_primitive!(i32);
impl_cast_from_pixel_to_primitive!(u32);
impl_cast_from_pixel_to_primitive!(usize);

/// One picture: a luma plane and two (possibly empty) chroma planes.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T: Pixel> {
    pub planes: [Plane<T>; N_C],
    pub chroma_sampling: ChromaSampling,
}

impl<T: Pixel> Frame<T> {
    pub fn new(width: usize, height: usize, chroma_sampling: ChromaSampling) -> Self {
        Frame::new_with_padding(width, height, chroma_sampling, 0)
    }

    pub fn new_with_padding(
        width: usize,
        height: usize,
        chroma_sampling: ChromaSampling,
        luma_padding: usize,
    ) -> Self {
        let (ss_x, ss_y) = chroma_sampling.sampling_period();
        let (xdec, ydec) = (ss_x >> 1, ss_y >> 1);
        let (chroma_width, chroma_height) = if chroma_sampling == ChromaSampling::Cs400 {
            (0, 0)
        } else {
            ((width + xdec) >> xdec, (height + ydec) >> ydec)
        };
        let chroma_padding_x = luma_padding >> xdec;
        let chroma_padding_y = luma_padding >> ydec;

        Frame {
            planes: [
                Plane::new(width, height, 0, 0, luma_padding, luma_padding),
                Plane::new(
                    chroma_width,
                    chroma_height,
                    xdec,
                    ydec,
                    chroma_padding_x,
                    chroma_padding_y,
                ),
                Plane::new(
                    chroma_width,
                    chroma_height,
                    xdec,
                    ydec,
                    chroma_padding_x,
                    chroma_padding_y,
                ),
            ],
            chroma_sampling,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_aligned<T>(ptr: *const T, n: usize) -> bool {
        ((ptr as usize) & ((1 << n) - 1)) == 0
    }

    #[test]
    fn sanity_heap() {
        let a: AlignedBoxedSlice<_> = AlignedBoxedSlice::new(3, 0u8);
        assert!(is_aligned(a.as_ptr(), 4));
    }

    #[test]
    fn empty_heap() {
        let a: AlignedBoxedSlice<u16> = AlignedBoxedSlice::new(0, 0);
        assert!(a.is_empty());
    }

    #[test]
    fn frame_400_has_empty_chroma() {
        let f = Frame::<u8>::new(64, 48, ChromaSampling::Cs400);
        assert_eq!(f.planes[0].cfg.width, 64);
        assert_eq!(f.planes[1].cfg.width, 0);
        assert_eq!(f.planes[2].cfg.height, 0);
    }

    #[test]
    fn frame_420_rounds_chroma_up() {
        let f = Frame::<u16>::new(65, 33, ChromaSampling::Cs420);
        assert_eq!(f.planes[1].cfg.width, 33);
        assert_eq!(f.planes[2].cfg.height, 17);
        assert_eq!(f.planes[1].cfg.xdec, 1);
    }
}

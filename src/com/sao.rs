use super::tbl::*;
use crate::api::frame::*;
use crate::cpu_features::CpuFeatureLevel;
use crate::def::*;
use crate::util::*;

use std::fmt;
use std::slice;

/*****************************************************************************
 * SAO parameters
 *****************************************************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SaoKind {
    None = 0,
    Band = 1,
    Edge = 2,
}

impl Default for SaoKind {
    fn default() -> Self {
        SaoKind::None
    }
}

impl fmt::Display for SaoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaoKind::None => write!(f, "none"),
            SaoKind::Band => write!(f, "band"),
            SaoKind::Edge => write!(f, "edge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum EdgeClass {
    EO0 = 0,
    EO1 = 1,
    EO2 = 2,
    EO3 = 3,
}

impl EdgeClass {
    pub const fn all() -> [EdgeClass; SAO_NUM_EO_CLASSES] {
        [EdgeClass::EO0, EdgeClass::EO1, EdgeClass::EO2, EdgeClass::EO3]
    }

    /// (dx, dy) of the two neighbours compared against the centre sample.
    #[inline]
    pub fn neighbors(self) -> [(isize, isize); 2] {
        evc_tbl_sao_eo_offsets[self as usize]
    }

    #[inline]
    pub(crate) fn uses_horizontal(self) -> bool {
        self != EdgeClass::EO1
    }

    #[inline]
    pub(crate) fn uses_vertical(self) -> bool {
        self != EdgeClass::EO0
    }

    /// Half-open ranges (x0, x1, y0, y1) of the samples of a `width` x `height`
    /// block whose neighbours both lie inside the block.
    pub(crate) fn interior(self, width: usize, height: usize) -> Option<(usize, usize, usize, usize)> {
        let h = self.uses_horizontal() as usize;
        let v = self.uses_vertical() as usize;
        if width <= 2 * h || height <= 2 * v {
            return None;
        }
        Some((h, width - h, v, height - v))
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EO{}", *self as u8)
    }
}

/// SAO decision of one CTU for one plane group. Slot 0 holds luma or Cb,
/// slot 1 holds Cr. Offsets are for edge categories 1..4 or for the four
/// bands starting at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaoMode {
    None,
    Edge {
        class: EdgeClass,
        offsets: [[i8; SAO_NUM_BAND_OFFSETS]; 2],
    },
    Band {
        position: [u8; 2],
        offsets: [[i8; SAO_NUM_BAND_OFFSETS]; 2],
    },
}

impl Default for SaoMode {
    fn default() -> Self {
        SaoMode::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaoMerge {
    None,
    Left,
    Up,
}

impl Default for SaoMerge {
    fn default() -> Self {
        SaoMerge::None
    }
}

/// Per-CTU record. A merged record carries the neighbour's resolved mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaoParams {
    pub mode: SaoMode,
    pub merge: SaoMerge,
    /// RD-added distortion of the chosen mode on this CTU.
    pub distortion: i32,
}

impl SaoParams {
    pub fn kind(&self) -> SaoKind {
        match self.mode {
            SaoMode::None => SaoKind::None,
            SaoMode::Edge { .. } => SaoKind::Edge,
            SaoMode::Band { .. } => SaoKind::Band,
        }
    }

    pub fn merge_left(&self) -> bool {
        self.merge == SaoMerge::Left
    }

    pub fn merge_up(&self) -> bool {
        self.merge == SaoMerge::Up
    }

    pub fn edge_class(&self) -> Option<EdgeClass> {
        match self.mode {
            SaoMode::Edge { class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn band_position(&self) -> [u8; 2] {
        match self.mode {
            SaoMode::Band { position, .. } => position,
            _ => [0; 2],
        }
    }

    /// Offsets in entropy-coder layout: `[0, o1..o4, 0, o1..o4]`.
    pub fn offsets(&self) -> [i8; 10] {
        let mut out = [0i8; 10];
        let slots = match self.mode {
            SaoMode::Edge { offsets, .. } | SaoMode::Band { offsets, .. } => offsets,
            SaoMode::None => return out,
        };
        for (slot, offsets) in slots.iter().enumerate() {
            out[slot * 5 + 1..slot * 5 + 5].copy_from_slice(offsets);
        }
        out
    }

    /// Same decision, with the merge flag dropped.
    pub fn without_merge(&self) -> SaoParams {
        SaoParams {
            merge: SaoMerge::None,
            ..*self
        }
    }

    /// Checks offset range, the edge sign rule and the band position limit.
    pub fn is_valid(&self, bit_depth: usize) -> bool {
        let max = SAO_ABS_OFFSET_MAX(bit_depth);
        match self.mode {
            SaoMode::None => true,
            SaoMode::Edge { offsets, .. } => offsets.iter().all(|o| {
                o.iter().enumerate().all(|(k, &v)| {
                    let v = v as i32;
                    v.abs() <= max && if k < 2 { v >= 0 } else { v <= 0 }
                })
            }),
            SaoMode::Band { position, offsets } => {
                position.iter().all(|&p| p <= SAO_MAX_BAND_POSITION)
                    && offsets
                        .iter()
                        .all(|o| o.iter().all(|&v| (v as i32).abs() <= max))
            }
        }
    }
}

/*****************************************************************************
 * edge classifier and band table
 *****************************************************************************/
#[inline(always)]
pub(crate) fn sao_edge_category(a: i32, b: i32, c: i32) -> usize {
    evc_tbl_sao_eo_remap[(EVC_SIGN3(c - a) + EVC_SIGN3(c - b) + 2) as usize] as usize
}

/// Edge offset table indexed by category, category 0 is always 0.
#[inline]
pub(crate) fn sao_eo_table(offsets: &[i8; SAO_NUM_BAND_OFFSETS]) -> [i32; SAO_NUM_EO_CATEGORIES] {
    [
        0,
        offsets[0] as i32,
        offsets[1] as i32,
        offsets[2] as i32,
        offsets[3] as i32,
    ]
}

/// Fills `lut` (`1 << bit_depth` entries) with identity outside the four
/// bands starting at `position` and `clip(v + offset)` inside.
pub(crate) fn sao_band_lut<T: Pixel>(
    bit_depth: usize,
    position: u8,
    offsets: &[i8; SAO_NUM_BAND_OFFSETS],
    lut: &mut [T],
) {
    let max = (1i32 << bit_depth) - 1;
    let shift = SAO_BAND_SHIFT(bit_depth);
    for (v, e) in lut.iter_mut().enumerate() {
        *e = T::cast_from(v);
    }
    for (i, &off) in offsets.iter().enumerate() {
        let b = position as usize + i;
        if b >= SAO_NUM_BANDS {
            break;
        }
        for v in (b << shift)..((b + 1) << shift) {
            lut[v] = T::cast_from(EVC_CLIP3(0, max, v as i32 + off as i32));
        }
    }
}

/*****************************************************************************
 * kernels
 *****************************************************************************/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EdgeStats {
    pub(crate) diff_sum: [i32; SAO_NUM_EO_CATEGORIES],
    pub(crate) count: [i32; SAO_NUM_EO_CATEGORIES],
}

pub(crate) type EdgeStatsFn = unsafe fn(
    orig: &[u8],
    rec: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    stats: &mut EdgeStats,
);

pub(crate) type EdgeDdistortionFn = unsafe fn(
    orig: &[u8],
    rec: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
) -> i32;

pub(crate) type BandDdistortionFn = unsafe fn(
    orig: &[u8],
    rec: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    position: u8,
    offsets: &[i32; SAO_NUM_BAND_OFFSETS],
) -> i32;

pub(crate) type ReconstructEdgeFn = unsafe fn(
    src: &[u8],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
);

pub(crate) type ReconstructBandFn = unsafe fn(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    lut: &[u8],
);

/// SIMD kernels for 8-bit samples. `None` entries fall back to the scalar
/// reference.
#[derive(Clone, Copy)]
pub(crate) struct SaoKernels {
    pub(crate) edge_stats: Option<EdgeStatsFn>,
    pub(crate) edge_ddistortion: Option<EdgeDdistortionFn>,
    pub(crate) band_ddistortion: Option<BandDdistortionFn>,
    pub(crate) reconstruct_edge: Option<ReconstructEdgeFn>,
    pub(crate) reconstruct_band: Option<ReconstructBandFn>,
}

impl SaoKernels {
    pub(crate) const RUST: SaoKernels = SaoKernels {
        edge_stats: None,
        edge_ddistortion: None,
        band_ddistortion: None,
        reconstruct_edge: None,
        reconstruct_band: None,
    };

    pub(crate) fn new(cpu: CpuFeatureLevel) -> SaoKernels {
        SAO_KERNELS[cpu.as_index()]
    }
}

impl fmt::Debug for SaoKernels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaoKernels")
            .field("edge_stats", &self.edge_stats.is_some())
            .field("edge_ddistortion", &self.edge_ddistortion.is_some())
            .field("band_ddistortion", &self.band_ddistortion.is_some())
            .field("reconstruct_edge", &self.reconstruct_edge.is_some())
            .field("reconstruct_band", &self.reconstruct_band.is_some())
            .finish()
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        use crate::asm::x86::sao::{SAO_KERNELS_AVX2, SAO_KERNELS_SSE4_1};

        cpu_function_lookup_table!(
            SAO_KERNELS: [SaoKernels],
            default: SaoKernels::RUST,
            [(SSE4_1, SAO_KERNELS_SSE4_1), (AVX2, SAO_KERNELS_AVX2)]
        );
    } else {
        cpu_function_lookup_table!(
            SAO_KERNELS: [SaoKernels],
            default: SaoKernels::RUST,
            []
        );
    }
}

#[inline(always)]
fn as_u8<T: Pixel>(s: &[T]) -> &[u8] {
    debug_assert!(T::type_enum() == PixelType::U8);
    unsafe { slice::from_raw_parts(s.as_ptr() as *const u8, s.len()) }
}

#[inline(always)]
fn as_u8_mut<T: Pixel>(s: &mut [T]) -> &mut [u8] {
    debug_assert!(T::type_enum() == PixelType::U8);
    unsafe { slice::from_raw_parts_mut(s.as_mut_ptr() as *mut u8, s.len()) }
}

pub(crate) fn sao_edge_stats<T: Pixel>(
    kernels: &SaoKernels,
    orig: &[T],
    rec: &[T],
    stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    stats: &mut EdgeStats,
) {
    match (T::type_enum(), kernels.edge_stats) {
        (PixelType::U8, Some(func)) => {
            #[cfg(feature = "check_asm")]
            let mut ref_stats = *stats;
            #[cfg(feature = "check_asm")]
            rust::edge_stats(orig, rec, stride, width, height, class, &mut ref_stats);

            // SAFETY: the table only holds kernels the CPU supports.
            unsafe { func(as_u8(orig), as_u8(rec), stride, width, height, class, stats) };

            #[cfg(feature = "check_asm")]
            assert_eq!(*stats, ref_stats);
        }
        _ => rust::edge_stats(orig, rec, stride, width, height, class, stats),
    }
}

pub(crate) fn sao_edge_ddistortion<T: Pixel>(
    kernels: &SaoKernels,
    orig: &[T],
    rec: &[T],
    stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
) -> i32 {
    match (T::type_enum(), kernels.edge_ddistortion) {
        (PixelType::U8, Some(func)) => {
            // SAFETY: the table only holds kernels the CPU supports.
            let dist =
                unsafe { func(as_u8(orig), as_u8(rec), stride, width, height, class, offsets) };

            #[cfg(feature = "check_asm")]
            assert_eq!(
                dist,
                rust::edge_ddistortion(orig, rec, stride, width, height, class, offsets)
            );

            dist
        }
        _ => rust::edge_ddistortion(orig, rec, stride, width, height, class, offsets),
    }
}

pub(crate) fn sao_band_ddistortion<T: Pixel>(
    kernels: &SaoKernels,
    bit_depth: usize,
    orig: &[T],
    rec: &[T],
    stride: usize,
    width: usize,
    height: usize,
    position: u8,
    offsets: &[i32; SAO_NUM_BAND_OFFSETS],
) -> i32 {
    match (T::type_enum(), kernels.band_ddistortion) {
        (PixelType::U8, Some(func)) if bit_depth == 8 => {
            // SAFETY: the table only holds kernels the CPU supports.
            let dist =
                unsafe { func(as_u8(orig), as_u8(rec), stride, width, height, position, offsets) };

            #[cfg(feature = "check_asm")]
            assert_eq!(
                dist,
                rust::band_ddistortion(
                    bit_depth, orig, rec, stride, width, height, position, offsets
                )
            );

            dist
        }
        _ => rust::band_ddistortion(bit_depth, orig, rec, stride, width, height, position, offsets),
    }
}

fn sao_reconstruct_edge<T: Pixel>(
    kernels: &SaoKernels,
    bit_depth: usize,
    src: &[T],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [T],
    dst_stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
) {
    match (T::type_enum(), kernels.reconstruct_edge) {
        (PixelType::U8, Some(func)) if bit_depth == 8 => {
            // SAFETY: the table only holds kernels the CPU supports.
            unsafe {
                func(
                    as_u8(src),
                    src_origin,
                    src_stride,
                    as_u8_mut(dst),
                    dst_stride,
                    width,
                    height,
                    class,
                    offsets,
                )
            };
        }
        _ => rust::reconstruct_edge(
            bit_depth, src, src_origin, src_stride, dst, dst_stride, width, height, class, offsets,
        ),
    }
}

fn sao_reconstruct_band<T: Pixel>(
    kernels: &SaoKernels,
    bit_depth: usize,
    src: &[T],
    src_stride: usize,
    dst: &mut [T],
    dst_stride: usize,
    width: usize,
    height: usize,
    lut: &[T],
) {
    match (T::type_enum(), kernels.reconstruct_band) {
        (PixelType::U8, Some(func)) if bit_depth == 8 => {
            // SAFETY: the table only holds kernels the CPU supports.
            unsafe {
                func(
                    as_u8(src),
                    src_stride,
                    as_u8_mut(dst),
                    dst_stride,
                    width,
                    height,
                    as_u8(lut),
                )
            };
        }
        _ => rust::reconstruct_band(src, src_stride, dst, dst_stride, width, height, lut),
    }
}

/*****************************************************************************
 * reconstruction
 *****************************************************************************/
/// Which sides of a block touch the picture border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SaoBorders {
    pub(crate) left: bool,
    pub(crate) top: bool,
    pub(crate) right: bool,
    pub(crate) bottom: bool,
}

/// Applies `mode` (plane slot `slot`) to a `width` x `height` block.
///
/// `src[src_origin]` is the top-left sample of the block; samples one row or
/// column outside the block must be readable unless the matching side is a
/// picture border. `dst` starts at the top-left sample of the output block.
pub(crate) fn sao_reconstruct_block<T: Pixel>(
    kernels: &SaoKernels,
    bit_depth: usize,
    mode: &SaoMode,
    slot: usize,
    src: &[T],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [T],
    dst_stride: usize,
    width: usize,
    height: usize,
    borders: SaoBorders,
) {
    if width == 0 || height == 0 {
        return;
    }

    match *mode {
        SaoMode::None => {
            pixels_blit(&src[src_origin..], src_stride, dst, dst_stride, width, height);
        }
        SaoMode::Band { position, offsets } => {
            let mut lut = [T::cast_from(0u8); SAO_MAX_LUT_SIZE];
            let lut = &mut lut[..1 << bit_depth];
            sao_band_lut(bit_depth, position[slot], &offsets[slot], lut);
            sao_reconstruct_band(
                kernels,
                bit_depth,
                &src[src_origin..],
                src_stride,
                dst,
                dst_stride,
                width,
                height,
                lut,
            );
        }
        SaoMode::Edge { class, offsets } => {
            pixels_blit(&src[src_origin..], src_stride, dst, dst_stride, width, height);

            let h = class.uses_horizontal();
            let v = class.uses_vertical();
            let x0 = (h && borders.left) as usize;
            let x1 = width - (h && borders.right) as usize;
            let y0 = (v && borders.top) as usize;
            let y1 = height - (v && borders.bottom) as usize;
            if x1 <= x0 || y1 <= y0 {
                return;
            }

            sao_reconstruct_edge(
                kernels,
                bit_depth,
                src,
                src_origin + y0 * src_stride + x0,
                src_stride,
                &mut dst[y0 * dst_stride + x0..],
                dst_stride,
                x1 - x0,
                y1 - y0,
                class,
                &sao_eo_table(&offsets[slot]),
            );
        }
    }
}

/*****************************************************************************
 * scalar reference
 *****************************************************************************/
pub(crate) mod rust {
    use super::*;

    #[inline(always)]
    fn neighbor(idx: usize, stride: usize, d: (isize, isize)) -> usize {
        (idx as isize + d.1 * stride as isize + d.0) as usize
    }

    pub(crate) fn edge_stats<T: Pixel>(
        orig: &[T],
        rec: &[T],
        stride: usize,
        width: usize,
        height: usize,
        class: EdgeClass,
        stats: &mut EdgeStats,
    ) {
        let (x0, x1, y0, y1) = match class.interior(width, height) {
            Some(r) => r,
            None => return,
        };
        let [da, db] = class.neighbors();
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y * stride + x;
                let c: i32 = rec[idx].into();
                let a: i32 = rec[neighbor(idx, stride, da)].into();
                let b: i32 = rec[neighbor(idx, stride, db)].into();
                let o: i32 = orig[idx].into();
                let cat = sao_edge_category(a, b, c);
                stats.diff_sum[cat] += o - c;
                stats.count[cat] += 1;
            }
        }
    }

    pub(crate) fn edge_ddistortion<T: Pixel>(
        orig: &[T],
        rec: &[T],
        stride: usize,
        width: usize,
        height: usize,
        class: EdgeClass,
        offsets: &[i32; SAO_NUM_EO_CATEGORIES],
    ) -> i32 {
        let (x0, x1, y0, y1) = match class.interior(width, height) {
            Some(r) => r,
            None => return 0,
        };
        let [da, db] = class.neighbors();
        let mut sum = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y * stride + x;
                let c: i32 = rec[idx].into();
                let a: i32 = rec[neighbor(idx, stride, da)].into();
                let b: i32 = rec[neighbor(idx, stride, db)].into();
                let o: i32 = orig[idx].into();
                let diff = o - c;
                let offset_diff = diff - offsets[sao_edge_category(a, b, c)];
                sum += offset_diff * offset_diff - diff * diff;
            }
        }
        sum
    }

    pub(crate) fn band_ddistortion<T: Pixel>(
        bit_depth: usize,
        orig: &[T],
        rec: &[T],
        stride: usize,
        width: usize,
        height: usize,
        position: u8,
        offsets: &[i32; SAO_NUM_BAND_OFFSETS],
    ) -> i32 {
        let shift = SAO_BAND_SHIFT(bit_depth);
        let max = (1i32 << bit_depth) - 1;
        let mut sum = 0;
        for y in 0..height {
            for x in 0..width {
                let idx = y * stride + x;
                let r: i32 = rec[idx].into();
                let o: i32 = orig[idx].into();
                let rel = (r >> shift) - position as i32;
                if rel < 0 || rel >= SAO_NUM_BAND_OFFSETS as i32 {
                    continue;
                }
                let diff = o - r;
                let offset_diff = o - EVC_CLIP3(0, max, r + offsets[rel as usize]);
                sum += offset_diff * offset_diff - diff * diff;
            }
        }
        sum
    }

    pub(crate) fn reconstruct_edge<T: Pixel>(
        bit_depth: usize,
        src: &[T],
        src_origin: usize,
        src_stride: usize,
        dst: &mut [T],
        dst_stride: usize,
        width: usize,
        height: usize,
        class: EdgeClass,
        offsets: &[i32; SAO_NUM_EO_CATEGORIES],
    ) {
        let max = (1i32 << bit_depth) - 1;
        let [da, db] = class.neighbors();
        for y in 0..height {
            for x in 0..width {
                let idx = src_origin + y * src_stride + x;
                let c: i32 = src[idx].into();
                let a: i32 = src[neighbor(idx, src_stride, da)].into();
                let b: i32 = src[neighbor(idx, src_stride, db)].into();
                let v = c + offsets[sao_edge_category(a, b, c)];
                dst[y * dst_stride + x] = T::cast_from(EVC_CLIP3(0, max, v));
            }
        }
    }

    pub(crate) fn reconstruct_band<T: Pixel>(
        src: &[T],
        src_stride: usize,
        dst: &mut [T],
        dst_stride: usize,
        width: usize,
        height: usize,
        lut: &[T],
    ) {
        for (s, d) in src
            .chunks(src_stride)
            .zip(dst.chunks_mut(dst_stride))
            .take(height)
        {
            for (s, d) in s[..width].iter().zip(d[..width].iter_mut()) {
                let v: usize = (*s).as_();
                *d = lut[v.min(lut.len() - 1)];
            }
        }
    }
}

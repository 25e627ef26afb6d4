use crate::com::sao::*;
use crate::def::*;

use std::arch::x86_64::*;
use std::cmp;

pub(crate) const SAO_KERNELS_SSE4_1: SaoKernels = SaoKernels {
    edge_stats: Some(edge_stats_sse4_1 as EdgeStatsFn),
    edge_ddistortion: Some(edge_ddistortion_sse4_1 as EdgeDdistortionFn),
    band_ddistortion: Some(band_ddistortion_sse4_1 as BandDdistortionFn),
    reconstruct_edge: Some(reconstruct_edge_sse4_1 as ReconstructEdgeFn),
    reconstruct_band: Some(reconstruct_band_sse4_1 as ReconstructBandFn),
};

pub(crate) const SAO_KERNELS_AVX2: SaoKernels = SaoKernels {
    edge_stats: Some(edge_stats_avx2 as EdgeStatsFn),
    edge_ddistortion: Some(edge_ddistortion_avx2 as EdgeDdistortionFn),
    band_ddistortion: Some(band_ddistortion_avx2 as BandDdistortionFn),
    reconstruct_edge: Some(reconstruct_edge_avx2 as ReconstructEdgeFn),
    reconstruct_band: Some(reconstruct_band_avx2 as ReconstructBandFn),
};

/* lane positions, compared against the valid sample count of a chunk */
static LANE_INDEX: [u8; 32] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
    26, 27, 28, 29, 30, 31,
];

/* category given to lanes past the end of a row, matches no real category */
const SAO_EO_CAT_INVALID: i8 = SAO_NUM_EO_CATEGORIES as i8;

#[inline(always)]
fn neighbor(idx: usize, stride: usize, d: (isize, isize)) -> usize {
    (idx as isize + d.1 * stride as isize + d.0) as usize
}

#[inline(always)]
fn eo_offset_bytes(offsets: &[i32; SAO_NUM_EO_CATEGORIES]) -> [i8; 16] {
    let mut t = [0i8; 16];
    for (k, &o) in offsets.iter().enumerate() {
        t[k] = o as i8;
    }
    t
}

#[inline(always)]
fn band_offset_bytes(offsets: &[i32; SAO_NUM_BAND_OFFSETS]) -> [i8; 16] {
    let mut t = [0i8; 16];
    for (k, &o) in offsets.iter().enumerate() {
        t[k] = o as i8;
    }
    t
}

/*****************************************************************************
 * SSE4.1, 16 samples per step
 *****************************************************************************/
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn load_16(src: &[u8]) -> __m128i {
    if src.len() >= 16 {
        _mm_loadu_si128(src.as_ptr() as *const __m128i)
    } else {
        let mut buf = [0u8; 16];
        buf[..src.len()].copy_from_slice(src);
        _mm_loadu_si128(buf.as_ptr() as *const __m128i)
    }
}

#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn store_16(dst: &mut [u8], v: __m128i) {
    if dst.len() >= 16 {
        _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, v);
    } else {
        let mut buf = [0u8; 16];
        _mm_storeu_si128(buf.as_mut_ptr() as *mut __m128i, v);
        let n = dst.len();
        dst.copy_from_slice(&buf[..n]);
    }
}

#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn hsum_epi32_128(v: __m128i) -> i32 {
    let s = _mm_add_epi32(v, _mm_shuffle_epi32(v, 0b01_00_11_10));
    let s = _mm_add_epi32(s, _mm_shuffle_epi32(s, 0b10_11_00_01));
    _mm_cvtsi128_si32(s)
}

/* all-ones in lanes below n */
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn valid_mask_16(n: usize) -> __m128i {
    let lanes = _mm_loadu_si128(LANE_INDEX.as_ptr() as *const __m128i);
    _mm_cmpgt_epi8(_mm_set1_epi8(n as i8), lanes)
}

/* edge category of c against a and b; invalid lanes get SAO_EO_CAT_INVALID */
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn eo_category_16(a: __m128i, b: __m128i, c: __m128i, valid: __m128i) -> __m128i {
    let bias = _mm_set1_epi8(-128);
    let ones = _mm_set1_epi8(1);
    let cb = _mm_xor_si128(c, bias);
    let s1 = _mm_sign_epi8(ones, _mm_subs_epi8(cb, _mm_xor_si128(a, bias)));
    let s2 = _mm_sign_epi8(ones, _mm_subs_epi8(cb, _mm_xor_si128(b, bias)));
    let idx = _mm_add_epi8(_mm_add_epi8(s1, s2), _mm_set1_epi8(2));
    let remap = _mm_setr_epi8(1, 2, 0, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0);
    let cat = _mm_shuffle_epi8(remap, idx);
    _mm_blendv_epi8(_mm_set1_epi8(SAO_EO_CAT_INVALID), cat, valid)
}

/* clip(v + off) for |off| < 128 */
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn add_offset_16(v: __m128i, off: __m128i) -> __m128i {
    let zero = _mm_setzero_si128();
    let pos = _mm_max_epi8(off, zero);
    let neg = _mm_max_epi8(_mm_sub_epi8(zero, off), zero);
    _mm_subs_epu8(_mm_adds_epu8(v, pos), neg)
}

/* (o - r')^2 - (o - r)^2 summed into i32 lanes */
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn ddist_16(o: __m128i, r: __m128i, r2: __m128i) -> __m128i {
    let o_lo = _mm_cvtepu8_epi16(o);
    let o_hi = _mm_cvtepu8_epi16(_mm_srli_si128(o, 8));
    let d_lo = _mm_sub_epi16(o_lo, _mm_cvtepu8_epi16(r));
    let d_hi = _mm_sub_epi16(o_hi, _mm_cvtepu8_epi16(_mm_srli_si128(r, 8)));
    let n_lo = _mm_sub_epi16(o_lo, _mm_cvtepu8_epi16(r2));
    let n_hi = _mm_sub_epi16(o_hi, _mm_cvtepu8_epi16(_mm_srli_si128(r2, 8)));
    let after = _mm_add_epi32(_mm_madd_epi16(n_lo, n_lo), _mm_madd_epi16(n_hi, n_hi));
    let before = _mm_add_epi32(_mm_madd_epi16(d_lo, d_lo), _mm_madd_epi16(d_hi, d_hi));
    _mm_sub_epi32(after, before)
}

#[target_feature(enable = "sse4.1")]
unsafe fn edge_stats_sse4_1(
    orig: &[u8],
    rec: &[u8],
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
    let one = _mm_set1_epi16(1);
    let mut sum = [_mm_setzero_si128(); SAO_NUM_EO_CATEGORIES];
    let mut count = [0i32; SAO_NUM_EO_CATEGORIES];

    for y in y0..y1 {
        let mut x = x0;
        while x < x1 {
            let n = cmp::min(16, x1 - x);
            let idx = y * stride + x;
            let (ia, ib) = (neighbor(idx, stride, da), neighbor(idx, stride, db));
            let c = load_16(&rec[idx..idx + n]);
            let a = load_16(&rec[ia..ia + n]);
            let b = load_16(&rec[ib..ib + n]);
            let o = load_16(&orig[idx..idx + n]);
            let cat = eo_category_16(a, b, c, valid_mask_16(n));

            let d_lo = _mm_sub_epi16(_mm_cvtepu8_epi16(o), _mm_cvtepu8_epi16(c));
            let d_hi = _mm_sub_epi16(
                _mm_cvtepu8_epi16(_mm_srli_si128(o, 8)),
                _mm_cvtepu8_epi16(_mm_srli_si128(c, 8)),
            );
            for k in 0..SAO_NUM_EO_CATEGORIES {
                let m = _mm_cmpeq_epi8(cat, _mm_set1_epi8(k as i8));
                count[k] += (_mm_movemask_epi8(m) as u32).count_ones() as i32;
                let m_lo = _mm_cvtepi8_epi16(m);
                let m_hi = _mm_cvtepi8_epi16(_mm_srli_si128(m, 8));
                let s = _mm_add_epi16(_mm_and_si128(d_lo, m_lo), _mm_and_si128(d_hi, m_hi));
                sum[k] = _mm_add_epi32(sum[k], _mm_madd_epi16(s, one));
            }
            x += 16;
        }
    }

    for k in 0..SAO_NUM_EO_CATEGORIES {
        stats.diff_sum[k] += hsum_epi32_128(sum[k]);
        stats.count[k] += count[k];
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn edge_ddistortion_sse4_1(
    orig: &[u8],
    rec: &[u8],
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
    let tbl = eo_offset_bytes(offsets);
    let off_tbl = _mm_loadu_si128(tbl.as_ptr() as *const __m128i);
    let mut acc = _mm_setzero_si128();

    for y in y0..y1 {
        let mut x = x0;
        while x < x1 {
            let n = cmp::min(16, x1 - x);
            let idx = y * stride + x;
            let (ia, ib) = (neighbor(idx, stride, da), neighbor(idx, stride, db));
            let c = load_16(&rec[idx..idx + n]);
            let a = load_16(&rec[ia..ia + n]);
            let b = load_16(&rec[ib..ib + n]);
            let o = load_16(&orig[idx..idx + n]);
            let cat = eo_category_16(a, b, c, valid_mask_16(n));
            let off = _mm_shuffle_epi8(off_tbl, cat);

            // edge offsets are applied without clipping
            let d_lo = _mm_sub_epi16(_mm_cvtepu8_epi16(o), _mm_cvtepu8_epi16(c));
            let d_hi = _mm_sub_epi16(
                _mm_cvtepu8_epi16(_mm_srli_si128(o, 8)),
                _mm_cvtepu8_epi16(_mm_srli_si128(c, 8)),
            );
            let n_lo = _mm_sub_epi16(d_lo, _mm_cvtepi8_epi16(off));
            let n_hi = _mm_sub_epi16(d_hi, _mm_cvtepi8_epi16(_mm_srli_si128(off, 8)));
            let after = _mm_add_epi32(_mm_madd_epi16(n_lo, n_lo), _mm_madd_epi16(n_hi, n_hi));
            let before = _mm_add_epi32(_mm_madd_epi16(d_lo, d_lo), _mm_madd_epi16(d_hi, d_hi));
            acc = _mm_add_epi32(acc, _mm_sub_epi32(after, before));
            x += 16;
        }
    }

    hsum_epi32_128(acc)
}

#[target_feature(enable = "sse4.1")]
unsafe fn band_ddistortion_sse4_1(
    orig: &[u8],
    rec: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    position: u8,
    offsets: &[i32; SAO_NUM_BAND_OFFSETS],
) -> i32 {
    let tbl = band_offset_bytes(offsets);
    let off_tbl = _mm_loadu_si128(tbl.as_ptr() as *const __m128i);
    let pos = _mm_set1_epi8(position as i8);
    let band_mask = _mm_set1_epi8(0x1f);
    let not3 = _mm_set1_epi8(!3);
    let three = _mm_set1_epi8(3);
    let zero = _mm_setzero_si128();
    let mut acc = _mm_setzero_si128();

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(16, width - x);
            let idx = y * stride + x;
            let r = load_16(&rec[idx..idx + n]);
            let o = load_16(&orig[idx..idx + n]);

            let band = _mm_and_si128(_mm_srli_epi16(r, 3), band_mask);
            let rel = _mm_sub_epi8(band, pos);
            let in_range = _mm_and_si128(
                _mm_cmpeq_epi8(_mm_and_si128(rel, not3), zero),
                valid_mask_16(n),
            );
            let off = _mm_and_si128(_mm_shuffle_epi8(off_tbl, _mm_and_si128(rel, three)), in_range);

            acc = _mm_add_epi32(acc, ddist_16(o, r, add_offset_16(r, off)));
            x += 16;
        }
    }

    hsum_epi32_128(acc)
}

#[target_feature(enable = "sse4.1")]
unsafe fn reconstruct_edge_sse4_1(
    src: &[u8],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
) {
    let [da, db] = class.neighbors();
    let tbl = eo_offset_bytes(offsets);
    let off_tbl = _mm_loadu_si128(tbl.as_ptr() as *const __m128i);

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(16, width - x);
            let idx = src_origin + y * src_stride + x;
            let (ia, ib) = (neighbor(idx, src_stride, da), neighbor(idx, src_stride, db));
            let c = load_16(&src[idx..idx + n]);
            let a = load_16(&src[ia..ia + n]);
            let b = load_16(&src[ib..ib + n]);
            let cat = eo_category_16(a, b, c, valid_mask_16(n));
            let off = _mm_shuffle_epi8(off_tbl, cat);

            let o = y * dst_stride + x;
            store_16(&mut dst[o..o + n], add_offset_16(c, off));
            x += 16;
        }
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn reconstruct_band_sse4_1(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    lut: &[u8],
) {
    if lut.len() < 256 {
        rust::reconstruct_band(src, src_stride, dst, dst_stride, width, height, lut);
        return;
    }
    let mut tbl = [_mm_setzero_si128(); 16];
    for (g, t) in tbl.iter_mut().enumerate() {
        *t = _mm_loadu_si128(lut[g * 16..g * 16 + 16].as_ptr() as *const __m128i);
    }
    let nibble = _mm_set1_epi8(0x0f);

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(16, width - x);
            let idx = y * src_stride + x;
            let v = load_16(&src[idx..idx + n]);
            let lo = _mm_and_si128(v, nibble);
            let hi = _mm_and_si128(_mm_srli_epi16(v, 4), nibble);
            let mut res = _mm_setzero_si128();
            for (g, t) in tbl.iter().enumerate() {
                let m = _mm_cmpeq_epi8(hi, _mm_set1_epi8(g as i8));
                res = _mm_blendv_epi8(res, _mm_shuffle_epi8(*t, lo), m);
            }

            let o = y * dst_stride + x;
            store_16(&mut dst[o..o + n], res);
            x += 16;
        }
    }
}

/*****************************************************************************
 * AVX2, 32 samples per step
 *****************************************************************************/
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn load_32(src: &[u8]) -> __m256i {
    if src.len() >= 32 {
        _mm256_loadu_si256(src.as_ptr() as *const __m256i)
    } else {
        let mut buf = [0u8; 32];
        buf[..src.len()].copy_from_slice(src);
        _mm256_loadu_si256(buf.as_ptr() as *const __m256i)
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn store_32(dst: &mut [u8], v: __m256i) {
    if dst.len() >= 32 {
        _mm256_storeu_si256(dst.as_mut_ptr() as *mut __m256i, v);
    } else {
        let mut buf = [0u8; 32];
        _mm256_storeu_si256(buf.as_mut_ptr() as *mut __m256i, v);
        let n = dst.len();
        dst.copy_from_slice(&buf[..n]);
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum_epi32_256(v: __m256i) -> i32 {
    hsum_epi32_128(_mm_add_epi32(
        _mm256_castsi256_si128(v),
        _mm256_extracti128_si256(v, 1),
    ))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn broadcast_16(t: &[i8; 16]) -> __m256i {
    _mm256_broadcastsi128_si256(_mm_loadu_si128(t.as_ptr() as *const __m128i))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn valid_mask_32(n: usize) -> __m256i {
    let lanes = _mm256_loadu_si256(LANE_INDEX.as_ptr() as *const __m256i);
    _mm256_cmpgt_epi8(_mm256_set1_epi8(n as i8), lanes)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn eo_category_32(a: __m256i, b: __m256i, c: __m256i, valid: __m256i) -> __m256i {
    let bias = _mm256_set1_epi8(-128);
    let ones = _mm256_set1_epi8(1);
    let cb = _mm256_xor_si256(c, bias);
    let s1 = _mm256_sign_epi8(ones, _mm256_subs_epi8(cb, _mm256_xor_si256(a, bias)));
    let s2 = _mm256_sign_epi8(ones, _mm256_subs_epi8(cb, _mm256_xor_si256(b, bias)));
    let idx = _mm256_add_epi8(_mm256_add_epi8(s1, s2), _mm256_set1_epi8(2));
    let remap = broadcast_16(&[1, 2, 0, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let cat = _mm256_shuffle_epi8(remap, idx);
    _mm256_blendv_epi8(_mm256_set1_epi8(SAO_EO_CAT_INVALID), cat, valid)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn add_offset_32(v: __m256i, off: __m256i) -> __m256i {
    let zero = _mm256_setzero_si256();
    let pos = _mm256_max_epi8(off, zero);
    let neg = _mm256_max_epi8(_mm256_sub_epi8(zero, off), zero);
    _mm256_subs_epu8(_mm256_adds_epu8(v, pos), neg)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn widen_u8_32(v: __m256i) -> (__m256i, __m256i) {
    (
        _mm256_cvtepu8_epi16(_mm256_castsi256_si128(v)),
        _mm256_cvtepu8_epi16(_mm256_extracti128_si256(v, 1)),
    )
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn widen_i8_32(v: __m256i) -> (__m256i, __m256i) {
    (
        _mm256_cvtepi8_epi16(_mm256_castsi256_si128(v)),
        _mm256_cvtepi8_epi16(_mm256_extracti128_si256(v, 1)),
    )
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn ddist_32(o: __m256i, r: __m256i, r2: __m256i) -> __m256i {
    let (o_lo, o_hi) = widen_u8_32(o);
    let (r_lo, r_hi) = widen_u8_32(r);
    let (q_lo, q_hi) = widen_u8_32(r2);
    let d_lo = _mm256_sub_epi16(o_lo, r_lo);
    let d_hi = _mm256_sub_epi16(o_hi, r_hi);
    let n_lo = _mm256_sub_epi16(o_lo, q_lo);
    let n_hi = _mm256_sub_epi16(o_hi, q_hi);
    let after = _mm256_add_epi32(_mm256_madd_epi16(n_lo, n_lo), _mm256_madd_epi16(n_hi, n_hi));
    let before = _mm256_add_epi32(_mm256_madd_epi16(d_lo, d_lo), _mm256_madd_epi16(d_hi, d_hi));
    _mm256_sub_epi32(after, before)
}

#[target_feature(enable = "avx2")]
unsafe fn edge_stats_avx2(
    orig: &[u8],
    rec: &[u8],
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
    let one = _mm256_set1_epi16(1);
    let mut sum = [_mm256_setzero_si256(); SAO_NUM_EO_CATEGORIES];
    let mut count = [0i32; SAO_NUM_EO_CATEGORIES];

    for y in y0..y1 {
        let mut x = x0;
        while x < x1 {
            let n = cmp::min(32, x1 - x);
            let idx = y * stride + x;
            let (ia, ib) = (neighbor(idx, stride, da), neighbor(idx, stride, db));
            let c = load_32(&rec[idx..idx + n]);
            let a = load_32(&rec[ia..ia + n]);
            let b = load_32(&rec[ib..ib + n]);
            let o = load_32(&orig[idx..idx + n]);
            let cat = eo_category_32(a, b, c, valid_mask_32(n));

            let (o_lo, o_hi) = widen_u8_32(o);
            let (c_lo, c_hi) = widen_u8_32(c);
            let d_lo = _mm256_sub_epi16(o_lo, c_lo);
            let d_hi = _mm256_sub_epi16(o_hi, c_hi);
            for k in 0..SAO_NUM_EO_CATEGORIES {
                let m = _mm256_cmpeq_epi8(cat, _mm256_set1_epi8(k as i8));
                count[k] += (_mm256_movemask_epi8(m) as u32).count_ones() as i32;
                let (m_lo, m_hi) = widen_i8_32(m);
                let s = _mm256_add_epi16(
                    _mm256_and_si256(d_lo, m_lo),
                    _mm256_and_si256(d_hi, m_hi),
                );
                sum[k] = _mm256_add_epi32(sum[k], _mm256_madd_epi16(s, one));
            }
            x += 32;
        }
    }

    for k in 0..SAO_NUM_EO_CATEGORIES {
        stats.diff_sum[k] += hsum_epi32_256(sum[k]);
        stats.count[k] += count[k];
    }
}

#[target_feature(enable = "avx2")]
unsafe fn edge_ddistortion_avx2(
    orig: &[u8],
    rec: &[u8],
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
    let off_tbl = broadcast_16(&eo_offset_bytes(offsets));
    let mut acc = _mm256_setzero_si256();

    for y in y0..y1 {
        let mut x = x0;
        while x < x1 {
            let n = cmp::min(32, x1 - x);
            let idx = y * stride + x;
            let (ia, ib) = (neighbor(idx, stride, da), neighbor(idx, stride, db));
            let c = load_32(&rec[idx..idx + n]);
            let a = load_32(&rec[ia..ia + n]);
            let b = load_32(&rec[ib..ib + n]);
            let o = load_32(&orig[idx..idx + n]);
            let cat = eo_category_32(a, b, c, valid_mask_32(n));
            let (off_lo, off_hi) = widen_i8_32(_mm256_shuffle_epi8(off_tbl, cat));

            let (o_lo, o_hi) = widen_u8_32(o);
            let (c_lo, c_hi) = widen_u8_32(c);
            let d_lo = _mm256_sub_epi16(o_lo, c_lo);
            let d_hi = _mm256_sub_epi16(o_hi, c_hi);
            let n_lo = _mm256_sub_epi16(d_lo, off_lo);
            let n_hi = _mm256_sub_epi16(d_hi, off_hi);
            let after =
                _mm256_add_epi32(_mm256_madd_epi16(n_lo, n_lo), _mm256_madd_epi16(n_hi, n_hi));
            let before =
                _mm256_add_epi32(_mm256_madd_epi16(d_lo, d_lo), _mm256_madd_epi16(d_hi, d_hi));
            acc = _mm256_add_epi32(acc, _mm256_sub_epi32(after, before));
            x += 32;
        }
    }

    hsum_epi32_256(acc)
}

#[target_feature(enable = "avx2")]
unsafe fn band_ddistortion_avx2(
    orig: &[u8],
    rec: &[u8],
    stride: usize,
    width: usize,
    height: usize,
    position: u8,
    offsets: &[i32; SAO_NUM_BAND_OFFSETS],
) -> i32 {
    let off_tbl = broadcast_16(&band_offset_bytes(offsets));
    let pos = _mm256_set1_epi8(position as i8);
    let band_mask = _mm256_set1_epi8(0x1f);
    let not3 = _mm256_set1_epi8(!3);
    let three = _mm256_set1_epi8(3);
    let zero = _mm256_setzero_si256();
    let mut acc = _mm256_setzero_si256();

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(32, width - x);
            let idx = y * stride + x;
            let r = load_32(&rec[idx..idx + n]);
            let o = load_32(&orig[idx..idx + n]);

            let band = _mm256_and_si256(_mm256_srli_epi16(r, 3), band_mask);
            let rel = _mm256_sub_epi8(band, pos);
            let in_range = _mm256_and_si256(
                _mm256_cmpeq_epi8(_mm256_and_si256(rel, not3), zero),
                valid_mask_32(n),
            );
            let off = _mm256_and_si256(
                _mm256_shuffle_epi8(off_tbl, _mm256_and_si256(rel, three)),
                in_range,
            );

            acc = _mm256_add_epi32(acc, ddist_32(o, r, add_offset_32(r, off)));
            x += 32;
        }
    }

    hsum_epi32_256(acc)
}

#[target_feature(enable = "avx2")]
unsafe fn reconstruct_edge_avx2(
    src: &[u8],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    class: EdgeClass,
    offsets: &[i32; SAO_NUM_EO_CATEGORIES],
) {
    let [da, db] = class.neighbors();
    let off_tbl = broadcast_16(&eo_offset_bytes(offsets));

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(32, width - x);
            let idx = src_origin + y * src_stride + x;
            let (ia, ib) = (neighbor(idx, src_stride, da), neighbor(idx, src_stride, db));
            let c = load_32(&src[idx..idx + n]);
            let a = load_32(&src[ia..ia + n]);
            let b = load_32(&src[ib..ib + n]);
            let cat = eo_category_32(a, b, c, valid_mask_32(n));
            let off = _mm256_shuffle_epi8(off_tbl, cat);

            let o = y * dst_stride + x;
            store_32(&mut dst[o..o + n], add_offset_32(c, off));
            x += 32;
        }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn reconstruct_band_avx2(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    lut: &[u8],
) {
    if lut.len() < 256 {
        rust::reconstruct_band(src, src_stride, dst, dst_stride, width, height, lut);
        return;
    }
    let mut tbl = [_mm256_setzero_si256(); 16];
    for (g, t) in tbl.iter_mut().enumerate() {
        *t = _mm256_broadcastsi128_si256(_mm_loadu_si128(
            lut[g * 16..g * 16 + 16].as_ptr() as *const __m128i
        ));
    }
    let nibble = _mm256_set1_epi8(0x0f);

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let n = cmp::min(32, width - x);
            let idx = y * src_stride + x;
            let v = load_32(&src[idx..idx + n]);
            let lo = _mm256_and_si256(v, nibble);
            let hi = _mm256_and_si256(_mm256_srli_epi16(v, 4), nibble);
            let mut res = _mm256_setzero_si256();
            for (g, t) in tbl.iter().enumerate() {
                let m = _mm256_cmpeq_epi8(hi, _mm256_set1_epi8(g as i8));
                res = _mm256_blendv_epi8(res, _mm256_shuffle_epi8(*t, lo), m);
            }

            let o = y * dst_stride + x;
            store_32(&mut dst[o..o + n], res);
            x += 32;
        }
    }
}

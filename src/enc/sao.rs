use super::util::*;
use crate::api::frame::*;
use crate::api::*;
use crate::com::sao::*;
use crate::def::*;
use crate::plane::*;
use crate::tracer::*;
use crate::util::*;

use log::*;

/*****************************************************************************
 * statistics
 *****************************************************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BandStats {
    pub(crate) diff_sum: [i32; SAO_NUM_BANDS],
    pub(crate) count: [i32; SAO_NUM_BANDS],
}

impl Default for BandStats {
    fn default() -> Self {
        BandStats {
            diff_sum: [0; SAO_NUM_BANDS],
            count: [0; SAO_NUM_BANDS],
        }
    }
}

pub(crate) fn sao_band_stats<T: Pixel>(
    bit_depth: usize,
    orig: &[T],
    rec: &[T],
    stride: usize,
    width: usize,
    height: usize,
    stats: &mut BandStats,
) {
    let shift = SAO_BAND_SHIFT(bit_depth);
    for y in 0..height {
        let o = &orig[y * stride..y * stride + width];
        let r = &rec[y * stride..y * stride + width];
        for (&o, &r) in o.iter().zip(r.iter()) {
            let r: i32 = r.into();
            let o: i32 = o.into();
            let band = ((r >> shift) as usize).min(SAO_NUM_BANDS - 1);
            stats.diff_sum[band] += o - r;
            stats.count[band] += 1;
        }
    }
}

/* rounded mean error, clipped to the coded range */
#[inline]
pub(crate) fn sao_offset_estimate(sum: i32, cnt: i32, max: i32) -> i32 {
    if cnt == 0 {
        return 0;
    }
    EVC_CLIP3(-max, max, (sum + (cnt >> 1)) / cnt)
}

/* N*h^2 - 2*h*E */
#[inline]
pub(crate) fn sao_ddist_estimate(cnt: i32, sum: i32, offset: i32) -> i64 {
    let (cnt, sum, offset) = (cnt as i64, sum as i64, offset as i64);
    cnt * offset * offset - 2 * offset * sum
}

/// Best starting band and its four offsets, with the estimated ddistortion
/// of the run.
pub(crate) fn sao_band_offsets(stats: &BandStats, max: i32) -> (u8, [i8; SAO_NUM_BAND_OFFSETS], i64) {
    let mut dist = [0i64; SAO_NUM_BANDS];
    let mut offsets = [0i32; SAO_NUM_BANDS];
    for band in 0..SAO_NUM_BANDS {
        let off = sao_offset_estimate(stats.diff_sum[band], stats.count[band], max);
        offsets[band] = off;
        dist[band] = sao_ddist_estimate(stats.count[band], stats.diff_sum[band], off);
    }

    let mut best_dist = i64::MAX;
    let mut best_pos = 0;
    for pos in 0..=SAO_MAX_BAND_POSITION as usize {
        let d: i64 = dist[pos..pos + SAO_NUM_BAND_OFFSETS].iter().sum();
        if d < best_dist {
            best_dist = d;
            best_pos = pos;
        }
    }

    let mut out = [0i8; SAO_NUM_BAND_OFFSETS];
    for (o, &v) in out.iter_mut().zip(&offsets[best_pos..best_pos + SAO_NUM_BAND_OFFSETS]) {
        *o = v as i8;
    }
    (best_pos as u8, out, best_dist)
}

/*****************************************************************************
 * rate model
 *****************************************************************************/
/// Merge candidates of a CTU as seen by the rate model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SaoNeighbors {
    pub(crate) left: bool,
    pub(crate) up: bool,
}

impl SaoSbacCtx {
    fn merge_prefix_bits(&self, nb: SaoNeighbors) -> f64 {
        let mut bits = 0.0;
        if nb.left {
            bits += self.merge_bits(0);
        }
        if nb.up {
            bits += self.merge_bits(0);
        }
        bits
    }

    pub(crate) fn sao_mode_bits_none(&self, nb: SaoNeighbors) -> f64 {
        self.merge_prefix_bits(nb) + self.type_bits(0)
    }

    pub(crate) fn sao_mode_bits_edge(
        &self,
        nb: SaoNeighbors,
        offsets: &[[i8; SAO_NUM_BAND_OFFSETS]; 2],
        planes: usize,
        bit_depth: usize,
    ) -> f64 {
        let max = SAO_ABS_OFFSET_MAX(bit_depth);
        let mut bits = self.merge_prefix_bits(nb) + self.type_bits(1) + 1.0;
        for plane in offsets.iter().take(planes) {
            for &o in plane {
                let abs = (o as i32).abs();
                bits += if abs == 0 || abs == max {
                    abs + 1
                } else {
                    abs + 2
                } as f64;
            }
        }
        bits + SAO_EO_CLASS_BITS
    }

    pub(crate) fn sao_mode_bits_band(
        &self,
        nb: SaoNeighbors,
        offsets: &[[i8; SAO_NUM_BAND_OFFSETS]; 2],
        planes: usize,
        bit_depth: usize,
    ) -> f64 {
        let max = SAO_ABS_OFFSET_MAX(bit_depth);
        let mut bits = self.merge_prefix_bits(nb) + self.type_bits(1) + 1.0;
        for plane in offsets.iter().take(planes) {
            for &o in plane {
                let abs = (o as i32).abs();
                // sign bit only for non-zero offsets
                bits += if abs == 0 {
                    1
                } else if abs == max {
                    abs + 2
                } else {
                    abs + 3
                } as f64;
            }
        }
        bits + SAO_BAND_POSITION_BITS * planes as f64
    }

    /* merge_up pays a merge_left=0 flag only when that flag is coded */
    pub(crate) fn sao_mode_bits_merge(&self, merge: SaoMerge, nb: SaoNeighbors) -> f64 {
        match merge {
            SaoMerge::None => 0.0,
            SaoMerge::Left => self.merge_bits(1),
            SaoMerge::Up => {
                let prefix = if nb.left { self.merge_bits(0) } else { 0.0 };
                prefix + self.merge_bits(1)
            }
        }
    }
}

#[inline]
pub(crate) fn sao_rd_cost(bits: f64, lambda: f64) -> i64 {
    (bits * lambda + 0.5) as i64
}

/*****************************************************************************
 * search
 *****************************************************************************/
/// Contiguous copies of one plane group of a CTU, `width` samples per row.
pub(crate) struct SaoBlock<'a, T: Pixel> {
    pub(crate) orig: [&'a [T]; 2],
    pub(crate) rec: [&'a [T]; 2],
    pub(crate) planes: usize,
    pub(crate) width: usize,
    pub(crate) height: usize,
}

/// Everything the search needs besides the samples.
pub(crate) struct SaoSearch<'a> {
    pub(crate) kernels: &'a SaoKernels,
    pub(crate) sbac: &'a SaoSbacCtx,
    pub(crate) bit_depth: usize,
    pub(crate) lambda: f64,
    pub(crate) feature_mask: u8,
}

/// Outcome of searching one plane group: the searched record and the RD
/// costs of [searched, merge left, merge up].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SaoGroupDecision {
    pub(crate) params: SaoParams,
    pub(crate) cost: [i64; 3],
}

impl<'a> SaoSearch<'a> {
    fn mode_ddistortion<T: Pixel>(&self, blk: &SaoBlock<T>, mode: &SaoMode) -> i32 {
        let mut dist = 0;
        for p in 0..blk.planes {
            dist += match *mode {
                SaoMode::None => 0,
                SaoMode::Edge { class, offsets } => sao_edge_ddistortion(
                    self.kernels,
                    blk.orig[p],
                    blk.rec[p],
                    blk.width,
                    blk.width,
                    blk.height,
                    class,
                    &sao_eo_table(&offsets[p]),
                ),
                SaoMode::Band { position, offsets } => {
                    let mut o = [0i32; SAO_NUM_BAND_OFFSETS];
                    for (d, &s) in o.iter_mut().zip(offsets[p].iter()) {
                        *d = s as i32;
                    }
                    sao_band_ddistortion(
                        self.kernels,
                        self.bit_depth,
                        blk.orig[p],
                        blk.rec[p],
                        blk.width,
                        blk.width,
                        blk.height,
                        position[p],
                        &o,
                    )
                }
            };
        }
        dist
    }

    /// Edge class and offsets minimizing the estimated cost.
    pub(crate) fn search_edge<T: Pixel>(&self, blk: &SaoBlock<T>, nb: SaoNeighbors) -> SaoMode {
        let max = SAO_ABS_OFFSET_MAX(self.bit_depth);
        let mut best = SaoMode::None;
        let mut best_cost = i64::MAX;

        for &class in EdgeClass::all().iter() {
            let mut offsets = [[0i8; SAO_NUM_BAND_OFFSETS]; 2];
            let mut ddist = 0;
            for p in 0..blk.planes {
                let mut stats = EdgeStats::default();
                sao_edge_stats(
                    self.kernels,
                    blk.orig[p],
                    blk.rec[p],
                    blk.width,
                    blk.width,
                    blk.height,
                    class,
                    &mut stats,
                );
                for cat in 1..SAO_NUM_EO_CATEGORIES {
                    let sum = stats.diff_sum[cat];
                    let cnt = stats.count[cat];
                    let mut offset = sao_offset_estimate(sum, cnt, max);
                    // sharpening can't be coded
                    if (cat <= 2 && offset < 0) || (cat >= 3 && offset > 0) {
                        offset = 0;
                    }
                    offsets[p][cat - 1] = offset as i8;
                    ddist += sao_ddist_estimate(cnt, sum, offset);
                }
            }

            let bits = self
                .sbac
                .sao_mode_bits_edge(nb, &offsets, blk.planes, self.bit_depth);
            let cost = ddist + sao_rd_cost(bits, self.lambda);
            if cost < best_cost {
                best_cost = cost;
                best = SaoMode::Edge { class, offsets };
            }
        }
        best
    }

    /// Per-plane band position and offsets.
    pub(crate) fn search_band<T: Pixel>(&self, blk: &SaoBlock<T>) -> SaoMode {
        let max = SAO_ABS_OFFSET_MAX(self.bit_depth);
        let mut position = [0u8; 2];
        let mut offsets = [[0i8; SAO_NUM_BAND_OFFSETS]; 2];
        for p in 0..blk.planes {
            let mut stats = BandStats::default();
            sao_band_stats(
                self.bit_depth,
                blk.orig[p],
                blk.rec[p],
                blk.width,
                blk.width,
                blk.height,
                &mut stats,
            );
            let (pos, off, _) = sao_band_offsets(&stats, max);
            position[p] = pos;
            offsets[p] = off;
        }
        SaoMode::Band { position, offsets }
    }

    fn mode_bits(&self, mode: &SaoMode, planes: usize, nb: SaoNeighbors) -> f64 {
        match mode {
            SaoMode::None => self.sbac.sao_mode_bits_none(nb),
            SaoMode::Edge { offsets, .. } => {
                self.sbac
                    .sao_mode_bits_edge(nb, offsets, planes, self.bit_depth)
            }
            SaoMode::Band { offsets, .. } => {
                self.sbac
                    .sao_mode_bits_band(nb, offsets, planes, self.bit_depth)
            }
        }
    }

    /// Searches edge and band, settles against doing nothing and prices
    /// the merge candidates on this block.
    pub(crate) fn best_mode<T: Pixel>(
        &self,
        blk: &SaoBlock<T>,
        left: Option<&SaoParams>,
        up: Option<&SaoParams>,
    ) -> SaoGroupDecision {
        let nb = SaoNeighbors {
            left: left.is_some(),
            up: up.is_some(),
        };

        let mut edge = (SaoMode::None, 0, i64::MAX);
        if self.feature_mask & SAO_FEATURE_EDGE != 0 {
            let mode = self.search_edge(blk, nb);
            let dist = self.mode_ddistortion(blk, &mode);
            let cost =
                sao_rd_cost(self.mode_bits(&mode, blk.planes, nb), self.lambda) + dist as i64;
            edge = (mode, dist, cost);
        }

        let mut band = (SaoMode::None, 0, i64::MAX);
        if self.feature_mask & SAO_FEATURE_BAND != 0 {
            let mode = self.search_band(blk);
            let dist = self.mode_ddistortion(blk, &mode);
            let cost =
                sao_rd_cost(self.mode_bits(&mode, blk.planes, nb), self.lambda) + dist as i64;
            band = (mode, dist, cost);
        }

        let (mut mode, mut distortion, mut cost) = if edge.2 <= band.2 { edge } else { band };

        let cost_of_nothing = sao_rd_cost(self.sbac.sao_mode_bits_none(nb), self.lambda);
        if cost >= cost_of_nothing {
            mode = SaoMode::None;
            distortion = 0;
            cost = cost_of_nothing;
        }

        let mut costs = [cost, i64::MAX, i64::MAX];
        for (i, (cand, merge)) in [(left, SaoMerge::Left), (up, SaoMerge::Up)]
            .iter()
            .enumerate()
        {
            if let Some(cand) = cand {
                let dist = self.mode_ddistortion(blk, &cand.mode);
                let bits = self.sbac.sao_mode_bits_merge(*merge, nb);
                costs[i + 1] = sao_rd_cost(bits, self.lambda) + dist as i64;
            }
        }

        SaoGroupDecision {
            params: SaoParams {
                mode,
                merge: SaoMerge::None,
                distortion,
            },
            cost: costs,
        }
    }
}

/// Picks between the searched records and the merge candidates, luma and
/// chroma deciding together.
pub(crate) fn sao_merge_decision(luma: &[i64; 3], chroma: &[i64; 3], nb: SaoNeighbors) -> SaoMerge {
    let total = |i: usize| luma[i].saturating_add(chroma[i]);
    let mut merge = SaoMerge::None;
    if nb.up && total(2) <= total(0) {
        merge = SaoMerge::Up;
    }
    if nb.left && total(1) <= total(0) && (merge != SaoMerge::Up || total(1) < total(2)) {
        merge = SaoMerge::Left;
    }
    merge
}

/*****************************************************************************
 * per-CTU selector
 *****************************************************************************/
/* copy the part of a CTU inside the plane into a contiguous block */
fn sao_fetch_block<T: Pixel>(
    plane: &Plane<T>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    dst: &mut [T],
) {
    let src = &plane.data[plane.offset(x, y)..];
    pixels_blit(src, plane.cfg.stride, dst, width, width, height);
}

impl<T: Pixel> Context<T> {
    fn sao_neighbor_available(&self, cx: usize, cy: usize, nx: usize, ny: usize) -> bool {
        match &self.region_ids {
            Some(ids) => ids[cy * self.w_lcu + cx] == ids[ny * self.w_lcu + nx],
            None => true,
        }
    }

    pub(crate) fn sao_search_ctu(&mut self, cx: usize, cy: usize, orig: &Frame<T>, rec: &Frame<T>) {
        let idx = cy * self.w_lcu + cx;
        let chroma = self.cfg.chroma_sampling != ChromaSampling::Cs400;

        if self.cfg.feature_mask & SAO_FEATURE_ALL == 0 {
            self.sao_luma[idx] = SaoParams::default();
            if chroma {
                self.sao_chroma[idx] = SaoParams::default();
            }
            trace!("sao ctu ({}, {}) disabled", cx, cy);
            return;
        }

        let left_idx = if cx > 0 && self.sao_neighbor_available(cx, cy, cx - 1, cy) {
            Some(idx - 1)
        } else {
            None
        };
        let up_idx = if cy > 0 && self.sao_neighbor_available(cx, cy, cx, cy - 1) {
            Some(idx - self.w_lcu)
        } else {
            None
        };
        let nb = SaoNeighbors {
            left: left_idx.is_some(),
            up: up_idx.is_some(),
        };

        let search = SaoSearch {
            kernels: &self.kernels,
            sbac: &self.sbac,
            bit_depth: self.cfg.bit_depth,
            lambda: self.cfg.lambda,
            feature_mask: self.cfg.feature_mask,
        };

        /* luma */
        let luma = {
            let plane = &rec.planes[Y_C];
            let x = cx * MAX_CU_SIZE;
            let y = cy * MAX_CU_SIZE;
            let width = MAX_CU_SIZE.min(plane.cfg.width - x);
            let height = MAX_CU_SIZE.min(plane.cfg.height - y);

            let mut orig_blk = [T::cast_from(0u8); MAX_CU_DIM];
            let mut rec_blk = [T::cast_from(0u8); MAX_CU_DIM];
            sao_fetch_block(&orig.planes[Y_C], x, y, width, height, &mut orig_blk);
            sao_fetch_block(plane, x, y, width, height, &mut rec_blk);

            let blk = SaoBlock {
                orig: [&orig_blk[..], &orig_blk[..]],
                rec: [&rec_blk[..], &rec_blk[..]],
                planes: 1,
                width,
                height,
            };
            search.best_mode(
                &blk,
                left_idx.map(|i| &self.sao_luma[i]),
                up_idx.map(|i| &self.sao_luma[i]),
            )
        };

        /* chroma */
        let chroma_decision = if chroma {
            let plane = &rec.planes[U_C];
            let size = MAX_CU_SIZE >> 1;
            let x = cx * size;
            let y = cy * size;
            let width = size.min(plane.cfg.width - x);
            let height = size.min(plane.cfg.height - y);

            let mut orig_blk = [[T::cast_from(0u8); MAX_CU_DIM >> 2]; 2];
            let mut rec_blk = [[T::cast_from(0u8); MAX_CU_DIM >> 2]; 2];
            for (i, c) in [U_C, V_C].iter().enumerate() {
                sao_fetch_block(&orig.planes[*c], x, y, width, height, &mut orig_blk[i]);
                sao_fetch_block(&rec.planes[*c], x, y, width, height, &mut rec_blk[i]);
            }

            let blk = SaoBlock {
                orig: [&orig_blk[0][..], &orig_blk[1][..]],
                rec: [&rec_blk[0][..], &rec_blk[1][..]],
                planes: 2,
                width,
                height,
            };
            Some(search.best_mode(
                &blk,
                left_idx.map(|i| &self.sao_chroma[i]),
                up_idx.map(|i| &self.sao_chroma[i]),
            ))
        } else {
            None
        };

        let chroma_cost = chroma_decision.map_or([0; 3], |d| d.cost);
        let merge = sao_merge_decision(&luma.cost, &chroma_cost, nb);

        // a merged record is the neighbour's record with the flag set
        let resolve = |records: &[SaoParams], decision: &SaoGroupDecision| -> SaoParams {
            match (merge, left_idx, up_idx) {
                (SaoMerge::Left, Some(i), _) | (SaoMerge::Up, _, Some(i)) => SaoParams {
                    merge,
                    ..records[i]
                },
                _ => decision.params,
            }
        };

        let mut luma_params = resolve(&self.sao_luma, &luma);
        let mut chroma_params = chroma_decision.map(|d| resolve(&self.sao_chroma, &d));

        let bit_depth = self.cfg.bit_depth;
        let valid =
            luma_params.is_valid(bit_depth) && chroma_params.map_or(true, |p| p.is_valid(bit_depth));
        if !valid {
            warn!(
                "sao ctu ({}, {}): invalid decision {:?} / {:?}, disabling",
                cx, cy, luma_params, chroma_params
            );
            debug_assert!(false, "invalid SAO decision at ({}, {})", cx, cy);
            luma_params = SaoParams::default();
            chroma_params = chroma_params.map(|_| SaoParams::default());
        }

        self.sao_luma[idx] = luma_params;
        TRACE_SAO(&mut self.tracer, cx, cy, SaoGroup::Luma, &luma_params);
        trace!(
            "sao ctu ({}, {}) luma {} merge {:?} dist {}",
            cx,
            cy,
            luma_params.kind(),
            luma_params.merge,
            luma_params.distortion
        );
        if let Some(p) = chroma_params {
            self.sao_chroma[idx] = p;
            TRACE_SAO(&mut self.tracer, cx, cy, SaoGroup::Chroma, &p);
            trace!(
                "sao ctu ({}, {}) chroma {} merge {:?} dist {}",
                cx,
                cy,
                p.kind(),
                p.merge,
                p.distortion
            );
        }
    }
}

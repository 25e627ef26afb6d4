use std::fmt;
use std::io::Write;
use std::marker::PhantomData;

use log::*;
use thiserror::Error;

pub mod config;
pub mod frame;

#[cfg(test)]
mod test;

pub use config::*;
use frame::*;

pub use crate::com::sao::{EdgeClass, SaoKind, SaoMerge, SaoMode, SaoParams};
pub use crate::cpu_features::CpuFeatureLevel;
pub use crate::enc::util::SaoSbacCtx;
pub use crate::plane::{Plane, PlaneConfig};

use crate::com::sao::*;
use crate::def::*;
use crate::tracer::*;
use crate::util::*;

/*****************************************************************************
 * errors
 *****************************************************************************/
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaoError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("out of memory")]
    OutOfMemory,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(C)]
pub enum ChromaSampling {
    Cs400,
    Cs420,
    Cs422,
    Cs444,
}

impl Default for ChromaSampling {
    fn default() -> Self {
        ChromaSampling::Cs420
    }
}

impl From<u8> for ChromaSampling {
    fn from(val: u8) -> Self {
        use self::ChromaSampling::*;
        match val {
            0 => Cs400,
            1 => Cs420,
            2 => Cs422,
            _ => Cs444,
        }
    }
}

impl ChromaSampling {
    // Provides the sampling period in the horizontal and vertical axes.
    pub fn sampling_period(self) -> (usize, usize) {
        use self::ChromaSampling::*;
        match self {
            Cs420 => (2, 2),
            Cs422 => (2, 1),
            Cs444 => (1, 1),
            Cs400 => (2, 2),
        }
    }
}

/// Plane group sharing one SAO record per CTU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaoGroup {
    Luma,
    Chroma,
}

impl SaoGroup {
    pub fn of_plane(plane: usize) -> SaoGroup {
        if plane == Y_C {
            SaoGroup::Luma
        } else {
            SaoGroup::Chroma
        }
    }
}

impl fmt::Display for SaoGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaoGroup::Luma => write!(f, "luma"),
            SaoGroup::Chroma => write!(f, "chroma"),
        }
    }
}

/*****************************************************************************
 * context
 *****************************************************************************/
fn alloc_records(n: usize) -> Result<Vec<SaoParams>, SaoError> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(n)
        .map_err(|_| SaoError::OutOfMemory)?;
    records.resize(n, SaoParams::default());
    Ok(records)
}

/// Per-frame SAO state: configuration, selected kernels and the per-CTU
/// records of both plane groups.
pub struct Context<T: Pixel> {
    pub(crate) cfg: SaoConfig,
    pub(crate) cpu: CpuFeatureLevel,
    pub(crate) kernels: SaoKernels,
    pub(crate) sbac: SaoSbacCtx,

    pub(crate) w_lcu: usize,
    pub(crate) h_lcu: usize,
    pub(crate) sao_luma: Vec<SaoParams>,
    pub(crate) sao_chroma: Vec<SaoParams>,
    pub(crate) region_ids: Option<Vec<u16>>,

    pub(crate) tracer: Option<Tracer>,
    _pixel: PhantomData<T>,
}

impl<T: Pixel> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cfg", &self.cfg)
            .field("cpu", &self.cpu)
            .field("kernels", &self.kernels)
            .field("w_lcu", &self.w_lcu)
            .field("h_lcu", &self.h_lcu)
            .finish()
    }
}

impl<T: Pixel> Context<T> {
    pub fn init(cfg: &SaoConfig, rate: SaoSbacCtx) -> Result<Self, SaoError> {
        cfg.validate()?;
        if cfg.bit_depth > T::max_bit_depth() {
            return Err(SaoError::InvalidConfig(format!(
                "{}-bit samples don't fit {:?} storage",
                cfg.bit_depth,
                T::type_enum()
            )));
        }

        let (w_lcu, h_lcu) = cfg.ctu_grid();
        let n = w_lcu * h_lcu;
        let sao_luma = alloc_records(n)?;
        let sao_chroma = if cfg.chroma_sampling == ChromaSampling::Cs400 {
            Vec::new()
        } else {
            alloc_records(n)?
        };

        let cpu = CpuFeatureLevel::detect_capped(cfg.cpu_feature_level);
        let kernels = SaoKernels::new(cpu);
        debug!(
            "sao init: {}x{} {}-bit {:?}, {}x{} ctus, mask {:#04b}, lambda {}, cpu {:?}",
            cfg.width,
            cfg.height,
            cfg.bit_depth,
            cfg.chroma_sampling,
            w_lcu,
            h_lcu,
            cfg.feature_mask,
            cfg.lambda,
            cpu
        );

        Ok(Context {
            cfg: *cfg,
            cpu,
            kernels,
            sbac: rate,
            w_lcu,
            h_lcu,
            sao_luma,
            sao_chroma,
            region_ids: None,
            tracer: OPEN_TRACE(),
            _pixel: PhantomData,
        })
    }

    pub fn teardown(mut self) -> Result<(), SaoError> {
        if let Some((writer, _)) = self.tracer.as_mut() {
            writer
                .flush()
                .map_err(|e| SaoError::Internal(format!("trace flush: {}", e)))?;
        }
        debug!(
            "sao teardown: releasing {} records",
            self.sao_luma.len() + self.sao_chroma.len()
        );
        Ok(())
    }

    pub fn config(&self) -> &SaoConfig {
        &self.cfg
    }

    pub fn cpu_feature_level(&self) -> CpuFeatureLevel {
        self.cpu
    }

    pub fn ctu_cols(&self) -> usize {
        self.w_lcu
    }

    pub fn ctu_rows(&self) -> usize {
        self.h_lcu
    }

    fn has_chroma(&self) -> bool {
        self.cfg.chroma_sampling != ChromaSampling::Cs400
    }

    /* visible size of `plane` */
    fn plane_dims(&self, plane: usize) -> (usize, usize) {
        if plane == Y_C {
            (self.cfg.width, self.cfg.height)
        } else if self.has_chroma() {
            ((self.cfg.width + 1) >> 1, (self.cfg.height + 1) >> 1)
        } else {
            (0, 0)
        }
    }

    fn plane_matches(&self, plane: usize, p: &Plane<T>) -> bool {
        (p.cfg.width, p.cfg.height) == self.plane_dims(plane)
    }

    fn frame_matches(&self, f: &Frame<T>) -> bool {
        let planes = if self.has_chroma() { N_C } else { 1 };
        (0..planes).all(|c| self.plane_matches(c, &f.planes[c]))
    }

    fn ctu_in_grid(&self, cx: usize, cy: usize) -> bool {
        if cx >= self.w_lcu || cy >= self.h_lcu {
            warn!(
                "sao ctu ({}, {}) outside the {}x{} grid",
                cx, cy, self.w_lcu, self.h_lcu
            );
            return false;
        }
        true
    }

    /// Chooses the SAO parameters of CTU (`cx`, `cy`) for every plane group.
    ///
    /// `rec` holds deblocked samples; CTUs left of and above this one must
    /// already have been searched.
    pub fn search_ctu(&mut self, cx: usize, cy: usize, orig: &Frame<T>, rec: &Frame<T>) {
        if !self.ctu_in_grid(cx, cy) {
            return;
        }
        if !self.frame_matches(orig) || !self.frame_matches(rec) {
            warn!("sao ctu ({}, {}): frame geometry mismatch, skipping", cx, cy);
            return;
        }
        self.sao_search_ctu(cx, cy, orig, rec);
    }

    /// Searches every CTU in raster order.
    pub fn search_frame(&mut self, orig: &Frame<T>, rec: &Frame<T>) {
        for cy in 0..self.h_lcu {
            for cx in 0..self.w_lcu {
                self.search_ctu(cx, cy, orig, rec);
            }
        }
    }

    /* block of CTU (cx, cy) in `plane`: (x, y, width, height, borders) */
    fn ctu_block(&self, cx: usize, cy: usize, plane: usize) -> (usize, usize, usize, usize, SaoBorders) {
        let (pw, ph) = self.plane_dims(plane);
        let size = if plane == Y_C {
            MAX_CU_SIZE
        } else {
            MAX_CU_SIZE >> 1
        };
        let x = cx * size;
        let y = cy * size;
        let width = size.min(pw.saturating_sub(x));
        let height = size.min(ph.saturating_sub(y));
        let borders = SaoBorders {
            left: x == 0,
            top: y == 0,
            right: x + width == pw,
            bottom: y + height == ph,
        };
        (x, y, width, height, borders)
    }

    fn record(&self, cx: usize, cy: usize, plane: usize) -> Option<&SaoParams> {
        match SaoGroup::of_plane(plane) {
            SaoGroup::Luma => self.sao_luma.get(cy * self.w_lcu + cx),
            SaoGroup::Chroma => self.sao_chroma.get(cy * self.w_lcu + cx),
        }
    }

    fn reconstruct_args_ok(&self, cx: usize, cy: usize, plane: usize) -> bool {
        if !self.ctu_in_grid(cx, cy) {
            return false;
        }
        if plane >= N_C || (plane != Y_C && !self.has_chroma()) {
            warn!("sao reconstruct: no plane {}", plane);
            return false;
        }
        true
    }

    /// Applies the stored parameters of CTU (`cx`, `cy`) to one plane,
    /// reading deblocked samples from `src` and writing the CTU area of `dst`.
    ///
    /// Samples next to the CTU are read from `src`; samples on the picture
    /// border whose neighbour is missing are copied unchanged.
    pub fn reconstruct_ctu(&self, cx: usize, cy: usize, plane: usize, src: &Plane<T>, dst: &mut Plane<T>) {
        if !self.reconstruct_args_ok(cx, cy, plane) {
            return;
        }
        if !self.plane_matches(plane, src) || !self.plane_matches(plane, dst) {
            warn!("sao reconstruct ({}, {}): plane {} geometry mismatch", cx, cy, plane);
            return;
        }
        let mode = match self.record(cx, cy, plane) {
            Some(p) => p.mode,
            None => SaoMode::None,
        };

        let (x, y, width, height, borders) = self.ctu_block(cx, cy, plane);
        let slot = (plane == V_C) as usize;
        let dst_origin = dst.offset(x, y);
        let dst_stride = dst.cfg.stride;
        sao_reconstruct_block(
            &self.kernels,
            self.cfg.bit_depth,
            &mode,
            slot,
            &src.data,
            src.offset(x, y),
            src.cfg.stride,
            &mut dst.data[dst_origin..],
            dst_stride,
            width,
            height,
            borders,
        );
    }

    /// In-place variant of [`reconstruct_ctu`](Self::reconstruct_ctu): the CTU
    /// and a one-sample ring around it are snapshotted first, so the ring is
    /// read with whatever `buf` holds at call time.
    pub fn reconstruct_ctu_in_place(&self, cx: usize, cy: usize, plane: usize, buf: &mut Plane<T>) {
        if !self.reconstruct_args_ok(cx, cy, plane) {
            return;
        }
        if !self.plane_matches(plane, buf) {
            warn!("sao reconstruct ({}, {}): plane {} geometry mismatch", cx, cy, plane);
            return;
        }
        let mode = match self.record(cx, cy, plane) {
            Some(p) => p.mode,
            None => SaoMode::None,
        };
        if mode == SaoMode::None {
            return;
        }

        let (x, y, width, height, borders) = self.ctu_block(cx, cy, plane);
        if width == 0 || height == 0 {
            return;
        }
        let (pw, ph) = self.plane_dims(plane);
        let ex0 = x.saturating_sub(1);
        let ey0 = y.saturating_sub(1);
        let ex1 = (x + width + 1).min(pw);
        let ey1 = (y + height + 1).min(ph);
        let stride = ex1 - ex0;

        const SNAP: usize = (MAX_CU_SIZE + 2) * (MAX_CU_SIZE + 2);
        let mut snap = [T::cast_from(0u8); SNAP];
        pixels_blit(
            &buf.data[buf.offset(ex0, ey0)..],
            buf.cfg.stride,
            &mut snap,
            stride,
            stride,
            ey1 - ey0,
        );

        let slot = (plane == V_C) as usize;
        let dst_origin = buf.offset(x, y);
        let dst_stride = buf.cfg.stride;
        sao_reconstruct_block(
            &self.kernels,
            self.cfg.bit_depth,
            &mode,
            slot,
            &snap,
            (y - ey0) * stride + (x - ex0),
            stride,
            &mut buf.data[dst_origin..],
            dst_stride,
            width,
            height,
            borders,
        );
    }

    /// Filters every plane of `src` into `dst` with the stored parameters.
    pub fn reconstruct_frame(&self, src: &Frame<T>, dst: &mut Frame<T>) {
        let planes = if self.has_chroma() { N_C } else { 1 };
        for plane in 0..planes {
            for cy in 0..self.h_lcu {
                for cx in 0..self.w_lcu {
                    self.reconstruct_ctu(cx, cy, plane, &src.planes[plane], &mut dst.planes[plane]);
                }
            }
        }
    }

    pub fn params(&self, cx: usize, cy: usize, group: SaoGroup) -> Option<&SaoParams> {
        if cx >= self.w_lcu || cy >= self.h_lcu {
            return None;
        }
        let idx = cy * self.w_lcu + cx;
        match group {
            SaoGroup::Luma => self.sao_luma.get(idx),
            SaoGroup::Chroma => self.sao_chroma.get(idx),
        }
    }

    /// Overrides a record, e.g. with parameters parsed from a bitstream.
    pub fn set_params(&mut self, cx: usize, cy: usize, group: SaoGroup, params: SaoParams) -> Result<(), SaoError> {
        if !params.is_valid(self.cfg.bit_depth) {
            return Err(SaoError::InvalidConfig(format!(
                "sao params out of range: {:?}",
                params
            )));
        }
        if cx >= self.w_lcu || cy >= self.h_lcu {
            return Err(SaoError::InvalidConfig(format!(
                "ctu ({}, {}) outside the {}x{} grid",
                cx, cy, self.w_lcu, self.h_lcu
            )));
        }
        let idx = cy * self.w_lcu + cx;
        let records = match group {
            SaoGroup::Luma => &mut self.sao_luma,
            SaoGroup::Chroma => &mut self.sao_chroma,
        };
        match records.get_mut(idx) {
            Some(r) => {
                *r = params;
                Ok(())
            }
            None => Err(SaoError::InvalidConfig(format!("no {} records", group))),
        }
    }

    /// Slice/tile id of every CTU in raster order. Merge candidates from a
    /// different region are unavailable.
    pub fn set_region_ids(&mut self, ids: Vec<u16>) -> Result<(), SaoError> {
        if ids.len() != self.w_lcu * self.h_lcu {
            return Err(SaoError::InvalidConfig(format!(
                "{} region ids for {} ctus",
                ids.len(),
                self.w_lcu * self.h_lcu
            )));
        }
        self.region_ids = Some(ids);
        Ok(())
    }

    pub fn set_lambda(&mut self, lambda: f64) -> Result<(), SaoError> {
        SaoConfig::validate_lambda(lambda)?;
        self.cfg.lambda = lambda;
        Ok(())
    }

    pub fn set_rate_ctx(&mut self, rate: SaoSbacCtx) {
        self.sbac = rate;
    }

    /// Clears every record before the next frame.
    pub fn reset(&mut self) {
        for r in self.sao_luma.iter_mut().chain(self.sao_chroma.iter_mut()) {
            *r = SaoParams::default();
        }
        EVC_TRACE_COUNTER_RESET(&mut self.tracer);
    }
}

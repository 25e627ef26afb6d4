use crate::def::*;

lazy_static! {
    /* -log2(p) in 1/32768 bit units, indexed by twice the probability in 1/512 */
    pub(crate) static ref entropy_bits: Box<[i32]> = {
        let mut bits = vec![0; 1024].into_boxed_slice();
        for i in 0..1024 {
            let p = (512.0 * (i as f64 + 0.5)) / 1024.0;
            bits[i] = (-32768.0 * (p.log10() / (2.0f64).log10() - 9.0)) as i32;
        }
        bits
    };
}

pub(crate) const ENTROPY_BITS_SCALE: f64 = 32768.0;

pub(crate) fn biari_no_bits(symbol: usize, cm: SBAC_CTX_MODEL) -> i32 {
    let mps = cm & 1;
    let mut state = cm >> 1;
    let sym = if symbol != 0 { 1 } else { 0 };
    state = if sym != mps { state } else { 512 - state };

    let idx = ((state as usize) << 1).min(entropy_bits.len() - 1);
    entropy_bits[idx]
}

/// Context models of the SAO syntax elements whose first bin is context
/// coded, as held by the entropy coder when the CTU is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaoSbacCtx {
    pub sao_merge_flag: [SBAC_CTX_MODEL; NUM_CTX_SAO_MERGE_FLAG],
    pub sao_type_idx: [SBAC_CTX_MODEL; NUM_CTX_SAO_TYPE_IDX],
}

impl Default for SaoSbacCtx {
    fn default() -> Self {
        SaoSbacCtx {
            sao_merge_flag: [PROB_INIT; NUM_CTX_SAO_MERGE_FLAG],
            sao_type_idx: [PROB_INIT; NUM_CTX_SAO_TYPE_IDX],
        }
    }
}

impl SaoSbacCtx {
    /* fractional bits of coding `symbol` with a context model */
    #[inline]
    pub(crate) fn fbits(model: SBAC_CTX_MODEL, symbol: usize) -> f64 {
        biari_no_bits(symbol, model) as f64 / ENTROPY_BITS_SCALE
    }

    #[inline]
    pub(crate) fn merge_bits(&self, symbol: usize) -> f64 {
        Self::fbits(self.sao_merge_flag[0], symbol)
    }

    #[inline]
    pub(crate) fn type_bits(&self, symbol: usize) -> f64 {
        Self::fbits(self.sao_type_idx[0], symbol)
    }
}

/*****************************************************************************
 * types
 *****************************************************************************/

pub(crate) const Y_C: usize = 0; /* Y luma */
pub(crate) const U_C: usize = 1; /* Cb Chroma */
pub(crate) const V_C: usize = 2; /* Cr Chroma */
pub(crate) const N_C: usize = 3; /* number of color component */

/* max CTU size */
pub const MAX_CU_LOG2: usize = 6; // baseline: 64x64
pub const MAX_CU_SIZE: usize = (1 << MAX_CU_LOG2);
pub(crate) const MAX_CU_DIM: usize = (1 << (MAX_CU_LOG2 + MAX_CU_LOG2));

/* supported sample bit depth */
pub(crate) const MIN_BIT_DEPTH: usize = 8;
pub(crate) const MAX_BIT_DEPTH: usize = 10;

/*****************************************************************************
 * SAO
 *****************************************************************************/
/* number of intensity bands */
pub const SAO_NUM_BANDS: usize = 32;
/* number of consecutive bands carrying an offset */
pub const SAO_NUM_BAND_OFFSETS: usize = 4;
/* last allowed starting band */
pub const SAO_MAX_BAND_POSITION: u8 = (SAO_NUM_BANDS - SAO_NUM_BAND_OFFSETS) as u8;
/* number of edge categories, category 0 never carries an offset */
pub const SAO_NUM_EO_CATEGORIES: usize = 5;
/* number of directional edge classes */
pub const SAO_NUM_EO_CLASSES: usize = 4;
/* bits for the band position and the edge class */
pub(crate) const SAO_BAND_POSITION_BITS: f64 = 5.0;
pub(crate) const SAO_EO_CLASS_BITS: f64 = 2.0;

/* feature enable mask */
pub const SAO_FEATURE_EDGE: u8 = 1 << 0;
pub const SAO_FEATURE_BAND: u8 = 1 << 1;
pub const SAO_FEATURE_ALL: u8 = SAO_FEATURE_EDGE | SAO_FEATURE_BAND;

/* entries of a band lookup table at the largest bit depth */
pub(crate) const SAO_MAX_LUT_SIZE: usize = 1 << MAX_BIT_DEPTH;

#[inline]
pub const fn SAO_ABS_OFFSET_MAX(bit_depth: usize) -> i32 {
    let bd = if bit_depth < MAX_BIT_DEPTH {
        bit_depth
    } else {
        MAX_BIT_DEPTH
    };
    (1 << (bd - 5)) - 1
}

#[inline]
pub const fn SAO_BAND_SHIFT(bit_depth: usize) -> usize {
    bit_depth - 5
}

/* CABAC (START) */
pub type SBAC_CTX_MODEL = u16;

pub const PROB_INIT: SBAC_CTX_MODEL = (512); /* 1/2 of initialization with mps = 0 */
/* CABAC (END) */

pub(crate) const NUM_CTX_SAO_MERGE_FLAG: usize = 1;
pub(crate) const NUM_CTX_SAO_TYPE_IDX: usize = 1;

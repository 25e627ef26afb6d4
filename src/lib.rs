#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate lazy_static;

#[macro_use]
mod cpu_features;

pub mod api;
mod com;
mod def;
mod enc;
mod plane;
mod tracer;
mod util;

#[cfg(target_arch = "x86_64")]
mod asm;

pub use api::frame::{Frame, Pixel, PixelType};
pub use api::*;
pub use def::{
    MAX_CU_SIZE, PROB_INIT, SAO_ABS_OFFSET_MAX, SAO_BAND_SHIFT, SAO_FEATURE_ALL, SAO_FEATURE_BAND,
    SAO_FEATURE_EDGE, SAO_MAX_BAND_POSITION, SAO_NUM_BANDS, SAO_NUM_BAND_OFFSETS,
    SAO_NUM_EO_CATEGORIES, SAO_NUM_EO_CLASSES, SBAC_CTX_MODEL,
};

#[cfg(feature = "bench")]
pub mod bench {
    pub mod frame {
        pub use crate::api::frame::*;
    }
    pub mod plane {
        pub use crate::plane::*;
    }
    pub mod sao {
        pub use crate::api::*;
    }
}

// Copyright (c) 2019-2022, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd)]
pub enum CpuFeatureLevel {
    RUST,
}

impl CpuFeatureLevel {
    #[cfg(test)]
    #[allow(unused)]
    pub(crate) const fn all() -> &'static [Self] {
        use CpuFeatureLevel::*;
        &[RUST]
    }

    pub const fn len() -> usize {
        CpuFeatureLevel::RUST as usize + 1
    }

    #[inline(always)]
    pub const fn as_index(self) -> usize {
        self as usize
    }
}

impl Default for CpuFeatureLevel {
    fn default() -> CpuFeatureLevel {
        CpuFeatureLevel::RUST
    }
}

// Without SIMD back-ends every table collapses to its default entry.
macro_rules! cpu_function_lookup_table {
    ($pub:vis $name:ident: [$type:ty], default: $empty:expr, [$(($key:ident, $value:expr)),*]) => {
        $pub static $name: [$type; crate::cpu_features::CpuFeatureLevel::len()] =
            [$empty; crate::cpu_features::CpuFeatureLevel::len()];
    };
}

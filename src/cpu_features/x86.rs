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
    SSE2,
    SSSE3,
    SSE4_1,
    AVX2,
}

impl CpuFeatureLevel {
    #[cfg(test)]
    pub(crate) const fn all() -> &'static [Self] {
        use CpuFeatureLevel::*;
        &[RUST, SSE2, SSSE3, SSE4_1, AVX2]
    }

    pub const fn len() -> usize {
        CpuFeatureLevel::AVX2 as usize + 1
    }

    #[inline(always)]
    pub const fn as_index(self) -> usize {
        self as usize
    }
}

impl Default for CpuFeatureLevel {
    fn default() -> CpuFeatureLevel {
        if is_x86_feature_detected!("avx2") {
            CpuFeatureLevel::AVX2
        } else if is_x86_feature_detected!("sse4.1") {
            CpuFeatureLevel::SSE4_1
        } else if is_x86_feature_detected!("ssse3") {
            CpuFeatureLevel::SSSE3
        } else if is_x86_feature_detected!("sse2") {
            CpuFeatureLevel::SSE2
        } else {
            CpuFeatureLevel::RUST
        }
    }
}

// Create a static lookup table for CPUFeatureLevel enums
// Note: keys are CpuFeatureLevels without any prefix (no CpuFeatureLevel::)
macro_rules! cpu_function_lookup_table {
    ($pub:vis $name:ident: [$type:ty], default: $empty:expr, [$(($key:ident, $value:expr)),*]) => {
        $pub static $name: [$type; crate::cpu_features::CpuFeatureLevel::len()] = {
            use crate::cpu_features::CpuFeatureLevel;
            #[allow(unused_mut)]
            let mut out: [$type; CpuFeatureLevel::len()] = [$empty; CpuFeatureLevel::len()];

            // Can't compare against $empty in a static
            #[allow(unused_mut)]
            let mut set: [bool; CpuFeatureLevel::len()] = [false; CpuFeatureLevel::len()];

            #[allow(unused_imports)]
            use CpuFeatureLevel::*;
            $(
                out[$key as usize] = $value;
                set[$key as usize] = true;
            )*
            cpu_function_lookup_table!(waterfall_cpu_features(out, set, [SSE2, SSSE3, SSE4_1, AVX2]));
            out
        };
    };

    // Fill empty output entries with the best lower level that has one.
    // cpus should be in order of lowest cpu level to highest
    (waterfall_cpu_features($out:ident, $set:ident, [$($cpu:ident),*])) => {
        // best[0] is a sink for levels without an entry, best[1] the carry
        #[allow(unused_assignments)]
        let mut best = [$out[0], $out[0]];
        $(
            best[$set[$cpu as usize] as usize] = $out[$cpu as usize];
            $out[$cpu as usize] = best[1];
        )*
    };
}

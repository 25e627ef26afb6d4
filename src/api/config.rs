use crate::api::*;
use crate::cpu_features::CpuFeatureLevel;
use crate::def::*;

// Filter settings which impact the chosen parameters.
#[derive(Clone, Copy, Debug)]
pub struct SaoConfig {
    // Width of the frames in pixels.
    pub width: usize,
    // Height of the frames in pixels.
    pub height: usize,

    // Bit depth.
    pub bit_depth: usize,
    // Chroma subsampling.
    pub chroma_sampling: ChromaSampling,

    // Bit 0 enables edge offsets, bit 1 band offsets.
    pub feature_mask: u8,
    // Lagrangian multiplier of the RD cost.
    pub lambda: f64,

    // Caps the SIMD back-end, `None` uses the best one detected.
    pub cpu_feature_level: Option<CpuFeatureLevel>,
}

impl Default for SaoConfig {
    fn default() -> Self {
        SaoConfig {
            width: 0,
            height: 0,
            bit_depth: 8,
            chroma_sampling: ChromaSampling::Cs420,
            feature_mask: SAO_FEATURE_ALL,
            lambda: 1.0,
            cpu_feature_level: None,
        }
    }
}

impl SaoConfig {
    pub fn new(width: usize, height: usize) -> Self {
        SaoConfig {
            width,
            height,
            ..Default::default()
        }
    }

    pub(crate) fn validate_lambda(lambda: f64) -> Result<(), SaoError> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(SaoError::InvalidConfig(format!(
                "lambda must be positive and finite, got {}",
                lambda
            )));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SaoError> {
        if self.width == 0 || self.height == 0 {
            return Err(SaoError::InvalidConfig(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }
        if self.bit_depth != MIN_BIT_DEPTH && self.bit_depth != MAX_BIT_DEPTH {
            return Err(SaoError::InvalidConfig(format!(
                "unsupported bit depth {}",
                self.bit_depth
            )));
        }
        match self.chroma_sampling {
            ChromaSampling::Cs400 | ChromaSampling::Cs420 => {}
            cs => {
                return Err(SaoError::InvalidConfig(format!(
                    "unsupported chroma sampling {:?}",
                    cs
                )))
            }
        }
        if self.feature_mask & !SAO_FEATURE_ALL != 0 {
            return Err(SaoError::InvalidConfig(format!(
                "unknown feature bits {:#04b}",
                self.feature_mask
            )));
        }
        Self::validate_lambda(self.lambda)
    }

    /// CTU grid size.
    pub fn ctu_grid(&self) -> (usize, usize) {
        (
            (self.width + MAX_CU_SIZE - 1) >> MAX_CU_LOG2,
            (self.height + MAX_CU_SIZE - 1) >> MAX_CU_LOG2,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_incomplete() {
        assert!(SaoConfig::default().validate().is_err());
        assert!(SaoConfig::new(64, 64).validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        let ok = SaoConfig::new(130, 70);
        assert_eq!(ok.ctu_grid(), (3, 2));

        for cfg in [
            SaoConfig { bit_depth: 12, ..ok },
            SaoConfig { bit_depth: 9, ..ok },
            SaoConfig {
                chroma_sampling: ChromaSampling::Cs444,
                ..ok
            },
            SaoConfig { lambda: 0.0, ..ok },
            SaoConfig { lambda: -2.0, ..ok },
            SaoConfig {
                lambda: f64::NAN,
                ..ok
            },
            SaoConfig {
                feature_mask: 0b100,
                ..ok
            },
        ]
        .iter()
        {
            match cfg.validate() {
                Err(SaoError::InvalidConfig(_)) => {}
                r => panic!("{:?} accepted: {:?}", cfg, r),
            }
        }

        assert!(SaoConfig {
            bit_depth: 10,
            chroma_sampling: ChromaSampling::Cs400,
            feature_mask: 0,
            ..ok
        }
        .validate()
        .is_ok());
    }
}

//! Reduction pipeline from standard-form systems to slim line-sum polytopes.
//!
//! ```text
//! system -> preprocess -> plane-sum -> slim line-sum
//! point  -> lift       -> plane-sum -> slim line-sum
//! ```

use crate::embedding::Embedding;
use crate::plane_sum::{self, PlaneSumPolytope};
use crate::slim_line_sum::{self, SlimLineSumPolytope};
use crate::system::{self, Preprocessed, StandardSystem};
use crate::utils::errors::{ReprResult, TransPolyError};
use log::{debug, info};

/// When to apply binary-decomposition preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocessMode {
    /// Only when some coefficient exceeds 2 in magnitude
    #[default]
    Auto,
    /// Always expand
    Always,
    /// Never expand
    Never,
}

/// Reduction pipeline configuration.
#[derive(Debug, Clone)]
pub struct ReductionConfig {
    /// Upper bound on every variable of the system
    pub upper_bound: i64,
    /// Preprocessing policy
    pub preprocess: PreprocessMode,
    /// Re-check every embedded point against its polytope's margins
    pub verify: bool,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            upper_bound: 1,
            preprocess: PreprocessMode::Auto,
            verify: false,
        }
    }
}

impl ReductionConfig {
    /// Create a configuration with the given upper bound.
    pub fn new(upper_bound: i64) -> Self {
        Self {
            upper_bound,
            ..Default::default()
        }
    }

    /// Set the preprocessing policy.
    pub fn with_preprocess(mut self, mode: PreprocessMode) -> Self {
        self.preprocess = mode;
        self
    }

    /// Enable or disable verification of embedded points.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// All representations of one system, built once.
#[derive(Debug, Clone)]
pub struct Reduction {
    config: ReductionConfig,
    preprocessed: Preprocessed,
    plane_sum: PlaneSumPolytope,
    slim: SlimLineSumPolytope,
}

impl Reduction {
    /// Run the encoder chain on `system`.
    pub fn build(system: &StandardSystem, config: &ReductionConfig) -> ReprResult<Self> {
        let preprocessed = match config.preprocess {
            PreprocessMode::Auto => system::preprocess(system),
            PreprocessMode::Always => system::binary_expand(system),
            PreprocessMode::Never => Preprocessed::identity(system.clone()),
        };
        debug!(
            "preprocessed system: {} rows, {} columns",
            preprocessed.system().nrows(),
            preprocessed.system().ncols()
        );

        let plane_sum = PlaneSumPolytope::encode(preprocessed.system(), config.upper_bound)?;
        let slim = SlimLineSumPolytope::encode(&plane_sum)?;

        let [rows, cols, planes] = slim.shape();
        info!(
            "reduced {}x{} system to a {}x{}x{} slim line-sum polytope",
            system.nrows(),
            system.ncols(),
            rows,
            cols,
            planes
        );

        Ok(Self {
            config: config.clone(),
            preprocessed,
            plane_sum,
            slim,
        })
    }

    /// The configuration this reduction was built with.
    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    /// The preprocessed system and its variable map.
    pub fn preprocessed(&self) -> &Preprocessed {
        &self.preprocessed
    }

    /// The intermediate plane-sum polytope.
    pub fn plane_sum(&self) -> &PlaneSumPolytope {
        &self.plane_sum
    }

    /// The final slim line-sum polytope.
    pub fn slim_line_sum(&self) -> &SlimLineSumPolytope {
        &self.slim
    }

    /// Consume and return the slim line-sum polytope.
    pub fn into_slim_line_sum(self) -> SlimLineSumPolytope {
        self.slim
    }

    /// Embed a point of the original system into the plane-sum polytope.
    ///
    /// The real coordinates cover the original variables only.
    pub fn embed_plane_sum(&self, y: &[i64]) -> ReprResult<Embedding> {
        let lifted = self.preprocessed.lift_point(y)?;
        let mut embedding =
            plane_sum::embed_encoded(&self.plane_sum, self.preprocessed.system(), &lifted)?;

        if self.preprocessed.is_expanded() {
            let real_coordinates: Vec<_> = self
                .preprocessed
                .original_columns()
                .iter()
                .map(|&c| embedding.real_coordinates[c])
                .collect();
            embedding.projected_point = self
                .preprocessed
                .original_columns()
                .iter()
                .map(|&c| embedding.projected_point[c])
                .collect();
            embedding.real_coordinates = real_coordinates;
        }

        if self.config.verify {
            self.plane_sum
                .check_plane_sums(&embedding.point)
                .map_err(|e| TransPolyError::Internal(format!("plane-sum embedding: {}", e)))?;
        }
        Ok(embedding)
    }

    /// Embed a point of the original system into the slim line-sum polytope.
    pub fn embed(&self, y: &[i64]) -> ReprResult<Embedding> {
        let inner = self.embed_plane_sum(y)?;
        let embedding = slim_line_sum::embed_encoded(
            &self.slim,
            &self.plane_sum,
            &inner.point,
            Some(inner.real_coordinates.as_slice()),
        )?;

        if self.config.verify {
            self.slim
                .check_line_sums(&embedding.point)
                .map_err(|e| TransPolyError::Internal(format!("slim line-sum embedding: {}", e)))?;
            if embedding.project() != y {
                return Err(TransPolyError::Internal(format!(
                    "projection {:?} does not reproduce {:?}",
                    embedding.project(),
                    y
                )));
            }
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(rows: &[Vec<i64>]) -> StandardSystem {
        StandardSystem::from_augmented_rows(rows).unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = ReductionConfig::new(7)
            .with_preprocess(PreprocessMode::Never)
            .with_verify(true);
        assert_eq!(config.upper_bound, 7);
        assert_eq!(config.preprocess, PreprocessMode::Never);
        assert!(config.verify);
        assert_eq!(ReductionConfig::default().preprocess, PreprocessMode::Auto);
    }

    #[test]
    fn test_reduction_without_preprocessing() {
        let s = system(&[vec![1, 1, 2]]);
        let r = Reduction::build(&s, &ReductionConfig::new(3).with_verify(true)).unwrap();
        assert!(!r.preprocessed().is_expanded());
        assert_eq!(r.slim_line_sum().shape(), [4, 6, 3]);

        let e = r.embed(&[2, 0]).unwrap();
        assert_eq!(e.projected_point, vec![2, 0]);
        assert_eq!(e.project(), vec![2, 0]);
    }

    #[test]
    fn test_reduction_with_preprocessing() {
        // 3 y0 = 3 expands to 2 x0 - x1 = 0, x0 + x1 = 3
        let s = system(&[vec![3, 3]]);
        let r = Reduction::build(&s, &ReductionConfig::new(3).with_verify(true)).unwrap();
        assert!(r.preprocessed().is_expanded());
        assert_eq!(r.plane_sum().capacities(), &[3, 1]);

        let inner = r.embed_plane_sum(&[1]).unwrap();
        assert_eq!(inner.real_coordinates.len(), 1);
        assert_eq!(inner.project(), vec![1]);

        let e = r.embed(&[1]).unwrap();
        assert_eq!(e.projected_point, vec![1]);
        assert_eq!(e.project(), vec![1]);
    }

    #[test]
    fn test_forced_modes() {
        let s = system(&[vec![2, 1, 2]]);
        let always = Reduction::build(&s, &ReductionConfig::new(4).with_preprocess(PreprocessMode::Always)).unwrap();
        assert!(always.preprocessed().is_expanded());

        let s = system(&[vec![3, 3]]);
        let never = Reduction::build(&s, &ReductionConfig::new(3).with_preprocess(PreprocessMode::Never)).unwrap();
        assert!(!never.preprocessed().is_expanded());
        assert_eq!(never.plane_sum().capacities(), &[3]);
        assert_eq!(never.embed(&[1]).unwrap().project(), vec![1]);
    }

    #[test]
    fn test_lifted_point_must_fit_bound() {
        // lifting y0 = 2 gives x1 = 4 > 3
        let s = system(&[vec![3, 6]]);
        let r = Reduction::build(&s, &ReductionConfig::new(3)).unwrap();
        assert!(r.embed(&[2]).unwrap_err().is_bound());
    }
}

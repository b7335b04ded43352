//! Checkpoint of a running optimization.
use crate::errors::{EgoError, Result};
use bopt_gp::GpError;
use log::info;
use ndarray::{Array1, Array2};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to resume an optimization where it was saved.
///
/// Samples are expressed in the space handled by the surrogate (the unit
/// hypercube for continuous problems). The state is a deep copy, it never
/// aliases the optimizer it comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationState {
    /// Number of iterations done after the initial design
    pub iter: usize,
    pub n_samples: usize,
    /// Input samples, one per row
    pub x_data: Array2<f64>,
    /// Output samples
    pub y_data: Array1<f64>,
    /// Random generator used to seed the next random draws
    pub rng: Xoshiro256Plus,
    /// Index of the best sample
    pub best_index: usize,
    /// Kernel hyperparameters of the surrogate
    pub hyperparameters: Array1<f64>,
    /// Noise of the surrogate
    pub noise: f64,
}

impl OptimizationState {
    /// Checks sample counts against each other and the input dimension `dim`
    pub fn check(&self, dim: usize) -> Result<()> {
        if self.x_data.nrows() != self.n_samples || self.y_data.len() != self.n_samples {
            return Err(EgoError::GpError(GpError::DimensionMismatch(format!(
                "checkpoint of {} samples holds {} inputs and {} outputs",
                self.n_samples,
                self.x_data.nrows(),
                self.y_data.len()
            ))));
        }
        if self.x_data.ncols() != dim {
            return Err(EgoError::GpError(GpError::DimensionMismatch(format!(
                "checkpoint samples of dimension {} for a problem of dimension {}",
                self.x_data.ncols(),
                dim
            ))));
        }
        if self.best_index >= self.n_samples {
            return Err(EgoError::InvalidState(format!(
                "best index {} out of {} samples",
                self.best_index, self.n_samples
            )));
        }
        Ok(())
    }

    /// Writes the state as json, creating parent directories if needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        info!("Checkpoint saved at {:?} (iter {})", path, self.iter);
        Ok(())
    }

    /// Reads a state written by [OptimizationState::save]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let state: OptimizationState = serde_json::from_slice(&data)?;
        info!("Checkpoint loaded from {:?} (iter {})", path, state.iter);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand::{Rng, SeedableRng};
    use serial_test::serial;

    fn state() -> OptimizationState {
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let _: u64 = rng.gen();
        OptimizationState {
            iter: 3,
            n_samples: 3,
            x_data: array![[0.1, 0.2], [1. / 3., 0.4], [0.7, 0.123456789012345]],
            y_data: array![1.5, -0.1, std::f64::consts::PI],
            rng,
            best_index: 1,
            hyperparameters: array![0.3, 1e-3 / 7.],
            noise: 1e-6,
        }
    }

    #[test]
    #[serial]
    fn test_save_load_is_exact() {
        let path = std::env::temp_dir().join("bopt_state_test/state.json");
        let mut saved = state();
        saved.save(&path).unwrap();
        let mut loaded = OptimizationState::load(&path).unwrap();
        assert_eq!(loaded, saved);
        // the generator continues identically
        assert_eq!(loaded.rng.gen::<u64>(), saved.rng.gen::<u64>());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_check() {
        let state = state();
        assert!(state.check(2).is_ok());
        assert!(matches!(
            state.check(3),
            Err(EgoError::GpError(GpError::DimensionMismatch(_)))
        ));
        let mut truncated = state.clone();
        truncated.y_data = array![1.5, -0.1];
        assert!(matches!(
            truncated.check(2),
            Err(EgoError::GpError(GpError::DimensionMismatch(_)))
        ));
        let mut wrong_best = state;
        wrong_best.best_index = 5;
        assert!(matches!(
            wrong_best.check(2),
            Err(EgoError::InvalidState(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            OptimizationState::load("does/not/exist.json"),
            Err(EgoError::IoError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_corrupted_file() {
        let path = std::env::temp_dir().join("bopt_corrupted_state.json");
        std::fs::write(&path, b"{\"iter\": 3, \"n_samples\":").unwrap();
        assert!(matches!(
            OptimizationState::load(&path),
            Err(EgoError::JsonError(_))
        ));
        std::fs::remove_file(&path).ok();
    }
}

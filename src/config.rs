/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
use crate::Real;
use std::fmt::{self, Display};

/// Where the samples of a batch are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Evaluate every sample on the calling thread
    Sequential,
    /// Split the samples over the rayon global thread pool
    Rayon,
}

impl Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Parallelism::Sequential => write!(f, "sequential"),
            Parallelism::Rayon => write!(f, "rayon"),
        }
    }
}

/// Explicit settings of a chain and of every evaluation against it
///
/// The numeric precision is the type parameter `T`. Nothing is read from global state.
///
/// # Examples
///
/// ```
/// use kdiff::{KinematicsConfig, Parallelism};
///
/// let config = KinematicsConfig::<f64>::sequential();
/// assert_eq!(config.parallelism, Parallelism::Sequential);
///
/// let config = KinematicsConfig::<f32> {
///     min_parallel_batch: 8,
///     ..Default::default()
/// };
/// assert_eq!(config.parallelism, Parallelism::Rayon);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsConfig<T: Real> {
    pub parallelism: Parallelism,
    /// Batches smaller than this are evaluated sequentially even with `Parallelism::Rayon`
    pub min_parallel_batch: usize,
    /// Max deviation of `RᵀR` from identity accepted for an origin transform
    pub orthonormality_tolerance: T,
}

impl<T: Real> Default for KinematicsConfig<T> {
    fn default() -> Self {
        Self {
            parallelism: Parallelism::Rayon,
            min_parallel_batch: 64,
            orthonormality_tolerance: T::default_epsilon().sqrt(),
        }
    }
}

impl<T: Real> KinematicsConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }
    /// Configuration which never leaves the calling thread
    pub fn sequential() -> Self {
        Self {
            parallelism: Parallelism::Sequential,
            ..Self::default()
        }
    }
    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }
    pub fn min_parallel_batch(mut self, min_parallel_batch: usize) -> Self {
        self.min_parallel_batch = min_parallel_batch;
        self
    }
    pub fn orthonormality_tolerance(mut self, tolerance: T) -> Self {
        self.orthonormality_tolerance = tolerance;
        self
    }
    /// Returns true if a batch of `batch_size` samples is split over the thread pool
    #[inline]
    pub fn runs_parallel(&self, batch_size: usize) -> bool {
        self.parallelism == Parallelism::Rayon && batch_size >= self.min_parallel_batch.max(2)
    }
}

#[test]
fn test_runs_parallel() {
    let config = KinematicsConfig::<f64>::default();
    assert!(!config.runs_parallel(1));
    assert!(config.runs_parallel(64));
    assert!(!KinematicsConfig::<f64>::sequential().runs_parallel(1000));
    let config = KinematicsConfig::<f64> {
        min_parallel_batch: 0,
        ..Default::default()
    };
    assert!(!config.runs_parallel(1));
    assert!(config.runs_parallel(2));
}

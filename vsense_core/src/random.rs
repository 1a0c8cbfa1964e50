// vsense_core/src/random.rs

//! Random variate sources used by every stochastic element of the engine.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::Deserialize;
use std::fmt::Debug;

/// Rejected pairs before the polar method gives up. A fair generator gets
/// this far with probability about 1e-43.
pub const MAX_POLAR_REJECTIONS: usize = 64;

// --- RANDOM SOURCE TRAIT ---
/// An injectable stream of uniform and Gaussian variates.
pub trait RandomSource: Debug + Send + Sync {
    /// A uniform variate in `[0, 1]`.
    fn uniform(&mut self) -> f64;

    /// A standard normal variate.
    ///
    /// The default is the polar (rejection) form of Box-Muller built on
    /// [`RandomSource::uniform`], so a scripted uniform stream fully
    /// determines the Gaussian stream.
    ///
    /// A stream that stays outside the unit circle for
    /// [`MAX_POLAR_REJECTIONS`] pairs in a row yields zero.
    fn gaussian(&mut self) -> f64 {
        for _ in 0..MAX_POLAR_REJECTIONS {
            let v1 = 2.0 * self.uniform() - 1.0;
            let v2 = 2.0 * self.uniform() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s >= 1.0 {
                continue;
            }
            if s == 0.0 {
                return 0.0;
            }
            return v1 * (-2.0 * s.ln() / s).sqrt();
        }
        0.0
    }
}

/// Which Gaussian sampler the engine builds when it owns its generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseSampler {
    /// Polar Box-Muller over the uniform stream.
    #[default]
    Polar,
    /// `rand_distr`'s ziggurat `StandardNormal`.
    Ziggurat,
}

impl NoiseSampler {
    pub fn seeded(self, seed: u64) -> Box<dyn RandomSource> {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        match self {
            NoiseSampler::Polar => Box::new(RngSource::new(rng)),
            NoiseSampler::Ziggurat => Box::new(StandardNormalSource::new(rng)),
        }
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn gaussian(&mut self) -> f64 {
        (**self).gaussian()
    }
}

// --- Concrete Sources ---

/// Polar Box-Muller on top of any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng + Debug + Send + Sync> RandomSource for RngSource<R> {
    fn uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..=1.0)
    }
}

/// Uniforms from the generator, Gaussians from `rand_distr::StandardNormal`.
#[derive(Debug, Clone)]
pub struct StandardNormalSource<R> {
    rng: R,
}

impl<R> StandardNormalSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Debug + Send + Sync> RandomSource for StandardNormalSource<R> {
    fn uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..=1.0)
    }

    fn gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

/// No noise at all: every Gaussian is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroNoise;

impl RandomSource for ZeroNoise {
    fn uniform(&mut self) -> f64 {
        0.5
    }

    fn gaussian(&mut self) -> f64 {
        0.0
    }
}

/// Replays a fixed list of uniforms, wrapping around at the end. A list
/// whose pairs all fall outside the unit circle, such as `[1.0]`, makes
/// every polar Gaussian zero.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    uniforms: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// # Panics
    /// If `uniforms` is empty.
    pub fn new(uniforms: Vec<f64>) -> Self {
        assert!(!uniforms.is_empty(), "ScriptedSource needs at least one value");
        Self {
            uniforms,
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        let value = self.uniforms[self.cursor];
        self.cursor = (self.cursor + 1) % self.uniforms.len();
        value
    }
}

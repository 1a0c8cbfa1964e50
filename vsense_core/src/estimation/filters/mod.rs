// vsense_core/src/estimation/filters/mod.rs

//! Downstream estimation stages that consume the synthetic sensors.

use crate::error::FilterError;
use crate::messages::{SensorField, UpdatedFields};
use dyn_clone::DynClone;
use std::fmt::Debug;

pub mod air;
pub mod baro;

pub use air::AirspeedFilter;
pub use baro::BaroBiasFilter;

/// The working set a filter chain reads and refines.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimationState {
    /// Which inputs carry a fresh value this run.
    pub updated: UpdatedFields,
    /// Barometric altitude, meters.
    pub baro: [f64; 1],
    /// Indicated airspeed, then true airspeed.
    pub airspeed: [f64; 2],
}

impl EstimationState {
    pub fn is_updated(&self, field: SensorField) -> bool {
        self.updated.contains(field)
    }
}

pub trait StateFilter: DynClone + Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Resets internal state. Called once before the first run.
    fn init(&mut self) -> Result<(), FilterError>;

    fn filter(&mut self, state: &mut EstimationState) -> Result<(), FilterError>;

    /// Names of stages that may only appear after this one in a chain.
    fn runs_before(&self) -> &'static [&'static str] {
        &[]
    }
}

dyn_clone::clone_trait_object!(StateFilter);

/// Runs its stages in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn StateFilter>>,
    initialized: bool,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl StateFilter + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    /// Appending invalidates any earlier `init`.
    pub fn push(&mut self, stage: Box<dyn StateFilter>) {
        self.stages.push(stage);
        self.initialized = false;
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Checks stage order, then initializes every stage.
    pub fn init(&mut self) -> Result<(), FilterError> {
        self.check_order()?;
        for stage in &mut self.stages {
            stage.init()?;
        }
        self.initialized = true;
        Ok(())
    }

    fn check_order(&self) -> Result<(), FilterError> {
        for (index, stage) in self.stages.iter().enumerate() {
            let ahead = self.stages[..index]
                .iter()
                .map(|earlier| earlier.name())
                .find(|name| stage.runs_before().contains(name));
            if let Some(ahead) = ahead {
                return Err(FilterError::StageOrder {
                    stage: stage.name(),
                    ahead,
                });
            }
        }
        Ok(())
    }

    /// Stops at the first failing stage; later stages do not see the state.
    pub fn run(&mut self, state: &mut EstimationState) -> Result<(), FilterError> {
        if !self.initialized {
            let stage = self.stages.first().map_or("chain", |stage| stage.name());
            return Err(FilterError::NotInitialized { stage });
        }
        for stage in &mut self.stages {
            stage.filter(state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts how often it ran.
    #[derive(Debug, Clone, Default)]
    struct CountingStage {
        runs: usize,
    }

    impl StateFilter for CountingStage {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn init(&mut self) -> Result<(), FilterError> {
            self.runs = 0;
            Ok(())
        }

        fn filter(&mut self, state: &mut EstimationState) -> Result<(), FilterError> {
            self.runs += 1;
            state.airspeed[1] += 1.0;
            Ok(())
        }
    }

    #[test]
    fn run_requires_init() {
        let mut chain = FilterChain::new().with_stage(CountingStage::default());
        let mut state = EstimationState::default();
        assert_eq!(
            chain.run(&mut state),
            Err(FilterError::NotInitialized { stage: "counting" })
        );
        chain.init().unwrap();
        chain.run(&mut state).unwrap();
        assert_eq!(state.airspeed[1], 1.0);
    }

    #[test]
    fn stops_at_first_error() {
        let mut chain = FilterChain::new()
            .with_stage(BaroBiasFilter::new(1))
            .with_stage(CountingStage::default());
        chain.init().unwrap();

        let mut state = EstimationState {
            updated: SensorField::Baro.into(),
            baro: [f64::NAN],
            airspeed: [0.0, 0.0],
        };
        assert_eq!(
            chain.run(&mut state),
            Err(FilterError::NonFinite { stage: "baro_bias" })
        );
        assert_eq!(state.airspeed[1], 0.0);
    }

    #[test]
    fn airspeed_behind_baro_bias_is_rejected() {
        let mut chain = FilterChain::new()
            .with_stage(BaroBiasFilter::new(5))
            .with_stage(AirspeedFilter::new());
        assert_eq!(
            chain.init(),
            Err(FilterError::StageOrder {
                stage: "airspeed",
                ahead: "baro_bias",
            })
        );
        assert!(chain.run(&mut EstimationState::default()).is_err());

        let mut chain = FilterChain::new()
            .with_stage(AirspeedFilter::new())
            .with_stage(CountingStage::default())
            .with_stage(BaroBiasFilter::new(5));
        assert_eq!(chain.init(), Ok(()));
    }

    #[test]
    fn cloned_chain_is_independent() {
        let mut chain = FilterChain::new().with_stage(AirspeedFilter::new());
        chain.init().unwrap();
        let mut copy = chain.clone();
        copy.push(Box::new(BaroBiasFilter::new(10)));
        assert_eq!(chain.len(), 1);
        assert_eq!(copy.stage_names().collect::<Vec<_>>(), ["airspeed", "baro_bias"]);
        // The copy gained a stage after init.
        assert!(copy.run(&mut EstimationState::default()).is_err());
    }
}

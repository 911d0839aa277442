//! Common test utilities for the tdnav test suite.
//!
//! Deterministic collaborators and random sources shared by the integration
//! tests. Not every test file uses every helper.
#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use rand::RngCore;
use tdnav::{
    pipeline::{BatchSummary, EpisodeRecord, Observer},
    ports::{Environment, FeatureSource},
    td::ValueEstimatorSnapshot,
    types::Position,
};

/// Environment that always starts episodes at the same position.
pub struct FixedStart {
    pub start: Position,
    pub sample: Vec<Position>,
}

impl FixedStart {
    pub fn new(start: Position) -> Self {
        Self {
            start,
            sample: vec![start],
        }
    }

    pub fn with_sample(mut self, sample: Vec<Position>) -> Self {
        self.sample = sample;
        self
    }
}

impl Environment for FixedStart {
    fn sample_random_position(&self, _rng: &mut dyn RngCore) -> Position {
        self.start
    }

    fn global_sample(&self) -> Vec<Position> {
        self.sample.clone()
    }
}

/// Single feature equal to the x coordinate.
pub struct RampX;

impl FeatureSource for RampX {
    fn dimension(&self) -> usize {
        1
    }

    fn evaluate(&self, position: Position) -> Vec<f64> {
        vec![position.x]
    }
}

/// Random source returning the same 64-bit word forever.
///
/// `ScriptedRng::new(0)` makes every uniform draw `0.0`, so any positive
/// success probability succeeds on the first tick. `ScriptedRng::new(u64::MAX)`
/// makes every draw just below `1.0`.
pub struct ScriptedRng {
    word: u64,
    draws: usize,
}

impl ScriptedRng {
    pub fn new(word: u64) -> Self {
        Self { word, draws: 0 }
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        (self.word >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.word
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.draws += 1;
        let bytes = self.word.to_le_bytes();
        for (i, byte) in dst.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }
}

/// Observer appending a line per event to a shared log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Rc<RefCell<Vec<String>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> tdnav::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("start {total_episodes}"));
        Ok(())
    }

    fn on_batch_start(
        &mut self,
        batch: usize,
        _snapshot: &ValueEstimatorSnapshot,
    ) -> tdnav::Result<()> {
        self.events.borrow_mut().push(format!("batch {batch}"));
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> tdnav::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("episode {}", record.episode));
        Ok(())
    }

    fn on_batch_end(&mut self, summary: &BatchSummary) -> tdnav::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("batch end {}", summary.batch));
        Ok(())
    }

    fn on_training_end(&mut self) -> tdnav::Result<()> {
        self.events.borrow_mut().push("end".to_string());
        Ok(())
    }
}

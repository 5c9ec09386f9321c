//=========================================================================
// Frame Pacing
//=========================================================================
//
// Fixed-step pacing between the host's render loop and the behavior
// engine.
//
// Each host frame:
//   1. FrameStepper::advance(delta) → StepPlan
//   2. host runs `physics_steps` fixed physics steps
//   3. if `run_logic`, the host calls Manager::update(...)
//
// FrameClock counts manager updates. Ranged attackers gate their
// cooldowns on it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::config::FrameConfig;

//=== StepPlan ============================================================

/// What the host should run for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub physics_steps: u32,
    pub run_logic: bool,
}

//=== FrameStepper ========================================================

#[derive(Debug, Clone)]
pub struct FrameStepper {
    physics_step_ms: f32,
    logic_step_ms: f32,
    accumulator: f32,
    frame_time: f32,
}

impl FrameStepper {
    /// # Panics
    ///
    /// Panics if either step is not positive.
    pub fn new(physics_step_ms: f32, logic_step_ms: f32) -> Self {
        assert!(physics_step_ms > 0.0, "Physics step must be positive, got {}", physics_step_ms);
        assert!(logic_step_ms > 0.0, "Logic step must be positive, got {}", logic_step_ms);
        Self {
            physics_step_ms,
            logic_step_ms,
            accumulator: 0.0,
            frame_time: 0.0,
        }
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        Self::new(config.physics_step_ms, config.logic_step_ms)
    }

    /// Feeds one host frame delta.
    pub fn advance(&mut self, delta_ms: f32) -> StepPlan {
        let delta_ms = delta_ms.max(0.0);
        self.frame_time += delta_ms;
        self.accumulator += delta_ms;

        let mut physics_steps = 0;
        while self.accumulator >= self.physics_step_ms {
            self.accumulator -= self.physics_step_ms;
            physics_steps += 1;
        }

        let run_logic = self.frame_time >= self.logic_step_ms;
        if run_logic {
            self.frame_time -= self.logic_step_ms;
        }

        StepPlan {
            physics_steps,
            run_logic,
        }
    }

    pub fn physics_step_ms(&self) -> f32 {
        self.physics_step_ms
    }
}

impl Default for FrameStepper {
    fn default() -> Self {
        Self::from_config(&FrameConfig::default())
    }
}

//=== FrameClock ==========================================================

/// Shared counter of logic frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: Rc<Cell<u64>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        let next = self.frame.get() + 1;
        self.frame.set(next);
        next
    }

    pub fn frame(&self) -> u64 {
        self.frame.get()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

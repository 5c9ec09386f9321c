//=========================================================================
// Behavior Configuration
//=========================================================================
//
// Per-archetype tunables, loadable from TOML.
//
// Every section defaults to the shipped game's constants, so a partial
// file only needs to name what it overrides:
//
//   [bat]
//   turn_after_ms = 1500.0
//
//   [dragon.cooldown_frames]
//   min = 60
//   max = 90
//
// Times are milliseconds, distances are world pixels, speeds are pixels
// per physics step.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use rand::Rng;
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::error::{BehaviorError, Result};

//=== Ranges ==============================================================

/// Inclusive float range sampled once per entity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Draws a value in `[min, max]`. A collapsed or inverted range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Inclusive frame-count range for cooldowns measured in rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameSpan {
    pub min: u64,
    pub max: u64,
}

impl FrameSpan {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

//=== BehaviorConfig ======================================================

/// Complete behavior configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub bat: BatConfig,
    pub crow: CrowConfig,
    pub zeppelin: ZeppelinConfig,
    pub firewalker: FireWalkerConfig,
    pub crab: CrabConfig,
    pub dragon: DragonConfig,
    pub fly: FlyConfig,
    pub bomb: BombConfig,
    pub tnt: TntConfig,
    pub projectile: ProjectileConfig,
    pub collision: CollisionConfig,
    pub terrain: TerrainConfig,
    pub frame: FrameConfig,
}

impl BehaviorConfig {
    /// Parses a TOML document. Missing sections and fields keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but would wedge the engine.
    pub fn validate(&self) -> Result<()> {
        if self.collision.channel_capacity == 0 {
            return Err(BehaviorError::InvalidConfig {
                field: "collision.channel_capacity",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<BehaviorConfig> {
    let contents = std::fs::read_to_string(path)?;
    BehaviorConfig::from_toml_str(&contents)
}

//--- Patrol archetypes ---------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatConfig {
    pub speed: Span,
    pub turn_after_ms: f32,
    /// Angular speed of the vertical bob, in radians per second.
    pub bob_speed: f32,
    pub bob_range: f32,
    pub bob_flip_ms: f32,
}

impl Default for BatConfig {
    fn default() -> Self {
        Self {
            speed: Span::new(5.0, 8.0),
            turn_after_ms: 2000.0,
            bob_speed: 0.3,
            bob_range: 10.0,
            bob_flip_ms: 200.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrowConfig {
    pub speed: f32,
    pub turn_after_ms: f32,
}

impl Default for CrowConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            turn_after_ms: 45_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZeppelinConfig {
    pub speed: Span,
    pub turn_after_ms: Span,
}

impl Default for ZeppelinConfig {
    fn default() -> Self {
        Self {
            speed: Span::new(0.5, 2.5),
            turn_after_ms: Span::new(4000.0, 8000.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FireWalkerConfig {
    pub speed: Span,
    pub turn_after_ms: Span,
    /// Extra speed while charging, as a fraction of the base speed.
    pub boost: f32,
    pub boost_cooldown_ms: f32,
    pub sight_tiles: f32,
    pub line_tolerance: f32,
}

impl Default for FireWalkerConfig {
    fn default() -> Self {
        Self {
            speed: Span::new(3.45, 4.55),
            turn_after_ms: Span::new(12_000.0, 18_000.0),
            boost: 0.8,
            boost_cooldown_ms: 1000.0,
            sight_tiles: 5.0,
            line_tolerance: 32.0,
        }
    }
}

//--- Crab ----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrabConfig {
    pub walk_speed: f32,
    pub first_turn_ms: Span,
    pub turn_ms: Span,
    pub dash_speed: f32,
    pub dash_ms: Span,
    pub pause_ms: Span,
    pub attack_ms: Span,
    pub attack_speed: f32,
    pub attack_power: u32,
    pub aggro_interval_ms: f32,
    pub aggro_tiles: f32,
    /// Player horizontal speed above which an aggro check escalates to attack.
    pub aggro_player_speed: f32,
    pub vertical_tolerance: f32,
    pub attack_radius: f32,
    pub evade_radius: f32,
    pub follow_radius: f32,
    pub approach_radius: f32,
    pub follow_giveup_ms: f32,
}

impl Default for CrabConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            first_turn_ms: Span::new(2500.0, 3500.0),
            turn_ms: Span::new(1500.0, 3350.0),
            dash_speed: 4.0,
            dash_ms: Span::new(500.0, 1000.0),
            pause_ms: Span::new(500.0, 3000.0),
            attack_ms: Span::new(2000.0, 5500.0),
            attack_speed: 3.55,
            attack_power: 3,
            aggro_interval_ms: 400.0,
            aggro_tiles: 3.0,
            aggro_player_speed: 3.0,
            vertical_tolerance: 16.0,
            attack_radius: 96.0,
            evade_radius: 128.0,
            follow_radius: 256.0,
            approach_radius: 150.0,
            follow_giveup_ms: 4000.0,
        }
    }
}

//--- Ranged archetypes ---------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DragonConfig {
    pub speed: f32,
    pub turn_after_ms: Span,
    pub sight_tiles: f32,
    pub cooldown_frames: FrameSpan,
    pub fireball_speed: f32,
    pub fireball_ttl_ms: Span,
}

impl Default for DragonConfig {
    fn default() -> Self {
        Self {
            speed: 3.5,
            turn_after_ms: Span::new(5500.0, 7500.0),
            sight_tiles: 8.0,
            cooldown_frames: FrameSpan::new(30, 200),
            fireball_speed: 11.0,
            fireball_ttl_ms: Span::new(1500.0, 2500.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlyConfig {
    pub wing_power: f32,
    pub sight_tiles: f32,
    pub first_think_ms: Span,
    pub cooldown_frames: FrameSpan,
    pub dropping_speed: f32,
    pub dropping_ttl_ms: Span,
    pub home_radius: f32,
    pub probe_distance: f32,
}

impl Default for FlyConfig {
    fn default() -> Self {
        Self {
            wing_power: 2.0,
            sight_tiles: 6.0,
            first_think_ms: Span::new(300.0, 2500.0),
            cooldown_frames: FrameSpan::new(20, 100),
            dropping_speed: 5.0,
            dropping_ttl_ms: Span::new(2500.0, 3500.0),
            home_radius: 32.0,
            probe_distance: 64.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub damage: f32,
    pub cause: String,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            damage: 25.0,
            cause: "lava".to_string(),
        }
    }
}

//--- Explosives ----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    pub speed: Span,
    pub idle_ms: Span,
    pub walk_ms: Span,
    pub first_fake_ms: Span,
    pub fake_ms: Span,
    /// Cleanup deadline after detonation if the blast animation never reports.
    pub fallback_ms: f32,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self {
            speed: Span::new(1.0, 1.75),
            idle_ms: Span::new(500.0, 2200.0),
            walk_ms: Span::new(1500.0, 5500.0),
            first_fake_ms: Span::new(3.0, 60.0),
            fake_ms: Span::new(3000.0, 30_000.0),
            fallback_ms: 250.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TntConfig {
    /// Number of `explosionN` cues to pick from for each cleared tile.
    pub sound_variants: u32,
    pub bounce_speed: f32,
}

impl Default for TntConfig {
    fn default() -> Self {
        Self {
            sound_variants: 6,
            bounce_speed: 18.0,
        }
    }
}

//--- Engine --------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Maximum vertical centre offset for a contact to count as a wall hit.
    pub blocked_dy: f32,
    /// Minimum height of the player above a body for a contact to be a stomp.
    pub stomp_min_dy: f32,
    pub channel_capacity: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            blocked_dy: 32.0,
            stomp_min_dy: 16.0,
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub ground_layer: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            ground_layer: "ground".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub physics_step_ms: f32,
    pub logic_step_ms: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            physics_step_ms: 1000.0 / 60.0,
            logic_step_ms: 1000.0 / 30.0,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    //--- Defaults ---------------------------------------------------------

    #[test]
    fn defaults_match_shipped_constants() {
        let config = BehaviorConfig::default();
        assert_eq!(config.bat.turn_after_ms, 2000.0);
        assert_eq!(config.crow.turn_after_ms, 45_000.0);
        assert_eq!(config.crab.attack_power, 3);
        assert_eq!(config.dragon.cooldown_frames, FrameSpan::new(30, 200));
        assert_eq!(config.bomb.fallback_ms, 250.0);
        assert_eq!(config.collision.blocked_dy, 32.0);
        assert_eq!(config.terrain.ground_layer, "ground");
    }

    //--- Parsing ----------------------------------------------------------

    #[test]
    fn partial_document_keeps_defaults() {
        let toml = r#"
            [bat]
            turn_after_ms = 1500.0

            [dragon.cooldown_frames]
            min = 60
            max = 90
        "#;

        let config = BehaviorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.bat.turn_after_ms, 1500.0);
        assert_eq!(config.bat.speed, Span::new(5.0, 8.0));
        assert_eq!(config.dragon.cooldown_frames, FrameSpan::new(60, 90));
        assert_eq!(config.fly.wing_power, 2.0);
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = BehaviorConfig::from_toml_str("[bat]\nturn_after_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::error::BehaviorError::Config(_)));
    }

    #[test]
    fn zero_collision_capacity_is_rejected() {
        let err = BehaviorConfig::from_toml_str("[collision]\nchannel_capacity = 0").unwrap_err();
        assert!(matches!(
            err,
            crate::error::BehaviorError::InvalidConfig { field: "collision.channel_capacity", .. }
        ));
        assert!(BehaviorConfig::from_toml_str("[collision]\nchannel_capacity = 1").is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, crate::error::BehaviorError::Io(_)));
    }

    //--- Sampling ---------------------------------------------------------

    #[test]
    fn span_samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let span = Span::new(3.45, 4.55);
        for _ in 0..100 {
            let v = span.sample(&mut rng);
            assert!((3.45..=4.55).contains(&v));
        }
    }

    #[test]
    fn collapsed_span_returns_min() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Span::fixed(2.0).sample(&mut rng), 2.0);
        assert_eq!(FrameSpan::new(9, 3).sample(&mut rng), 9);
    }
}

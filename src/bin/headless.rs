//=========================================================================
// Hoppa Headless Runner
//
// Drives a small demo level without a renderer or physics engine.
//
// Architecture:
// ```text
//     FrameStepper ──StepPlan──> Manager::update
//          ▲                          │
//     host delta               sprites / sound cues ──> log
// ```
//
// Contacts are scripted through the collision sender and one-shot clips
// are reported finished one logic frame after they start. Physics is not
// simulated, so `physics_steps` is only logged.
//
// Usage:
//   hoppa-headless [config.toml] [--seed N] [--frames N]
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use clap::Parser;
use crossbeam_channel::TrySendError;
use log::{info, warn};

//=== Internal Dependencies ===============================================

use hoppa_engine::core::collision::{BodyInfo, CollisionPair};
use hoppa_engine::prelude::*;

//=== Demo Level ==========================================================

const HOST_FRAME_MS: f32 = 1000.0 / 60.0;
const PLAYER_ID: EntityId = EntityId(1);

const LEVEL: [&str; 6] = [
    "....................",
    "....................",
    "....................",
    "....................",
    "....................",
    "####################",
];

/// Clips the host would report finished.
const ONE_SHOT_CLIPS: [&str; 7] = ["dead", "count", "boom", "active", "fire", "grow", "fireball"];

fn demo_objects() -> Vec<MapObject> {
    vec![
        MapObject::new("bat", 128.0, 64.0),
        MapObject::new("crab", 320.0, 256.0),
        MapObject::new("dragon", 768.0, 256.0),
        MapObject::new("bomb", 512.0, 256.0),
        MapObject::new("flower", 64.0, 256.0),
        MapObject::new("plant", 960.0, 256.0),
        MapObject::new("fly", 1088.0, 64.0),
        MapObject::new("tnt", 1152.0, 256.0).with_target(640.0, 320.0),
        MapObject::new("water", 0.0, 256.0),
        MapObject::new("changeskin", 1216.0, 256.0),
        MapObject::new("zeppelin", 640.0, 0.0),
    ]
}

//=== Command Line ========================================================

#[derive(Parser)]
#[command(name = "hoppa-headless", about = "Runs the demo level without a renderer")]
#[command(version)]
struct Args {
    /// TOML file with behavior tunables
    config: Option<PathBuf>,

    /// Seed for per-entity randomness
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Host frames to simulate at 60 Hz
    #[arg(long, default_value_t = 900)]
    frames: u32,
}

//=== Entry Point =========================================================

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading tunables from {}", path.display());
            load_config(path)?
        }
        None => BehaviorConfig::default(),
    };

    let player = Player::new(PLAYER_ID, 256.0, 288.0, 32.0, 64.0).into_ref();
    let mut stepper = FrameStepper::from_config(&config.frame);
    let stage = StageBuilder::new()
        .with_map(TileMap::from_rows(GROUND_LAYER, 64, &LEVEL))
        .with_player(&player)
        .with_config(config)
        .with_seed(args.seed)
        .build();

    let mut manager = Manager::new(stage.clone());
    for object in demo_objects() {
        match stage.spawn(&object) {
            Ok(entity) => manager.push(entity)?,
            Err(err) => warn!("Skipping {}: {}", object.name, err),
        }
    }
    info!(
        "Level ready: {} creatures, {} controllers, {} static objects",
        manager.creature_count(),
        manager.controller_count(),
        manager.static_count()
    );

    let contacts = manager.collision_sender();
    let mut time_ms = 0.0_f64;
    let mut last_logic_ms = 0.0_f64;
    let mut logic_frames = 0_u32;
    let mut finishing: Vec<(EntityId, String)> = Vec::new();

    for host_frame in 0..args.frames {
        time_ms += f64::from(HOST_FRAME_MS);
        let plan = stepper.advance(HOST_FRAME_MS);
        if !plan.run_logic {
            continue;
        }
        log::trace!("Host frame {}: {} physics steps", host_frame, plan.physics_steps);

        for (id, clip) in finishing.drain(..) {
            manager.notify_animation_complete(id, &clip);
        }

        if let Some(pair) = scripted_contact(&manager, logic_frames) {
            match contacts.try_send(pair) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("Collision feed full, contact dropped"),
                Err(TrySendError::Disconnected(_)) => warn!("Collision feed closed"),
            }
        }

        manager.update(time_ms, (time_ms - last_logic_ms) as f32);
        last_logic_ms = time_ms;
        logic_frames += 1;

        finishing = one_shot_clips(&manager);
        for cue in stage.sounds().drain() {
            info!("Sound cue {}", cue);
        }
    }

    let player = player.borrow();
    info!(
        "Ran {} logic frames: {} creatures, {} controllers left; player health {:.0}, alternate skin {}",
        logic_frames,
        manager.creature_count(),
        manager.controller_count(),
        player.health(),
        player.has_alternate_skin()
    );
    drop(player);

    manager.destroy();
    Ok(())
}

//=== Host Simulation =====================================================

/// Every 80 logic frames the player lands on the next stompable body;
/// halfway between, it walks into the skin switch.
fn scripted_contact(manager: &Manager, logic_frame: u32) -> Option<CollisionPair> {
    if logic_frame == 0 || logic_frame % 40 != 0 {
        return None;
    }
    let round = (logic_frame / 40) as usize;

    let sprites = manager.sprites();
    let mut bodies = sprites.iter().map(|sprite| sprite.borrow());
    let target = if round % 2 == 1 {
        bodies.find(|sprite| sprite.name().starts_with("changeskin"))?
    } else {
        let mut stompable: Vec<_> = bodies.filter(|sprite| is_stompable(sprite)).collect();
        if stompable.is_empty() {
            return None;
        }
        let index = (round / 2) % stompable.len();
        stompable.swap_remove(index)
    };

    let (x, y) = target.position();
    let (player_y, vy) = if round % 2 == 1 { (y, 0.0) } else { (y - 48.0, 3.0) };
    info!("Player contacts {}", target.name());
    Some(CollisionPair::new(
        BodyInfo::new(target.id(), target.name(), target.label(), (x, y)),
        BodyInfo::new(PLAYER_ID, "player", BodyLabel::Player, (x, player_y)).with_velocity(0.0, vy),
    ))
}

fn is_stompable(sprite: &Sprite) -> bool {
    let passive = ["water", "changeskin", "zeppelin"]
        .iter()
        .any(|prefix| sprite.name().starts_with(prefix));
    !passive && !sprite.is_static() && sprite.label() != BodyLabel::Projectile
}

fn one_shot_clips(manager: &Manager) -> Vec<(EntityId, String)> {
    manager
        .sprites()
        .iter()
        .filter_map(|sprite| {
            let sprite = sprite.borrow();
            let clip = sprite.animation()?;
            ONE_SHOT_CLIPS
                .contains(&clip)
                .then(|| (sprite.id(), clip.to_string()))
        })
        .collect()
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_the_default_demo() {
        let args = Args::try_parse_from(["hoppa-headless"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.seed, 7);
        assert_eq!(args.frames, 900);
    }

    #[test]
    fn config_seed_and_frames_are_read() {
        let args = Args::try_parse_from(["hoppa-headless", "level.toml", "--seed", "3", "--frames", "60"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("level.toml")));
        assert_eq!(args.seed, 3);
        assert_eq!(args.frames, 60);
    }

    #[test]
    fn malformed_frame_count_is_rejected() {
        assert!(Args::try_parse_from(["hoppa-headless", "--frames", "lots"]).is_err());
    }
}

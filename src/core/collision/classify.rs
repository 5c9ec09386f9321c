//=========================================================================
// Collision Classification
//=========================================================================
//
// Turns a raw collision pair into bus events.
//
// Rules, evaluated for each body that is not the player or ground:
//   projectile body              → touched
//   player above and not rising  → stomped
//   |dy| ≤ blocked tolerance     → blocked
//   player contact otherwise     → touched
//
// A player side hit within the tolerance yields both blocked and touched.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::config::CollisionConfig;
use crate::core::event_bus::{Event, Signal};
use crate::world::{BodyLabel, EntityId};

//=== BodyInfo ============================================================

/// Snapshot of one body as the physics engine reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyInfo {
    pub id: EntityId,
    pub name: String,
    pub label: BodyLabel,
    pub position: (f32, f32),
    pub velocity: (f32, f32),
}

impl BodyInfo {
    pub fn new(id: EntityId, name: impl Into<String>, label: BodyLabel, position: (f32, f32)) -> Self {
        Self {
            id,
            name: name.into(),
            label,
            position,
            velocity: (0.0, 0.0),
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.velocity = (vx, vy);
        self
    }

    fn reacts(&self) -> bool {
        !matches!(self.label, BodyLabel::Player | BodyLabel::Ground)
    }
}

//=== CollisionPair =======================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPair {
    pub a: BodyInfo,
    pub b: BodyInfo,
}

impl CollisionPair {
    pub fn new(a: BodyInfo, b: BodyInfo) -> Self {
        Self { a, b }
    }
}

//=== Tolerances ==========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub blocked_dy: f32,
    pub stomp_min_dy: f32,
}

impl From<&CollisionConfig> for Tolerances {
    fn from(config: &CollisionConfig) -> Self {
        Self {
            blocked_dy: config.blocked_dy,
            stomp_min_dy: config.stomp_min_dy,
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::from(&CollisionConfig::default())
    }
}

//=== classify ============================================================

/// Events produced by one contact, for both bodies.
pub fn classify(pair: &CollisionPair, tolerances: &Tolerances) -> Vec<Event> {
    let mut events = Vec::new();

    for (subject, other) in [(&pair.a, &pair.b), (&pair.b, &pair.a)] {
        if !subject.reacts() {
            continue;
        }

        for signal in signals_for(subject, other, tolerances) {
            events.push(Event::contact(&subject.name, signal, subject.id, other.id, other.label));
        }
    }
    events
}

fn signals_for(subject: &BodyInfo, other: &BodyInfo, tolerances: &Tolerances) -> Vec<Signal> {
    if subject.label == BodyLabel::Projectile {
        return vec![Signal::Touched];
    }

    // Positive when the other body sits higher on screen.
    let rise = subject.position.1 - other.position.1;
    let dy = rise.abs();

    if other.label == BodyLabel::Player {
        if rise > tolerances.stomp_min_dy && other.velocity.1 >= 0.0 {
            return vec![Signal::Stomped];
        }
        if dy <= tolerances.blocked_dy {
            return vec![Signal::Blocked, Signal::Touched];
        }
        return vec![Signal::Touched];
    }

    if dy <= tolerances.blocked_dy {
        vec![Signal::Blocked]
    } else {
        Vec::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn crab(y: f32) -> BodyInfo {
        BodyInfo::new(EntityId(1), "crab", BodyLabel::Creature, (100.0, y))
    }

    fn player(y: f32, vy: f32) -> BodyInfo {
        BodyInfo::new(EntityId(0), "player", BodyLabel::Player, (100.0, y)).with_velocity(0.0, vy)
    }

    fn signals(events: &[Event]) -> Vec<(String, Signal)> {
        events
            .iter()
            .map(|e| (e.topic.name().to_string(), e.signal()))
            .collect()
    }

    //--- Player contacts --------------------------------------------------

    #[test]
    fn falling_player_from_above_stomps() {
        let events = classify(&CollisionPair::new(crab(300.0), player(250.0, 4.0)), &Tolerances::default());
        assert_eq!(signals(&events), vec![("crab".to_string(), Signal::Stomped)]);
        assert_eq!(events[0].source, EntityId(1));
    }

    #[test]
    fn rising_player_does_not_stomp() {
        let events = classify(&CollisionPair::new(crab(300.0), player(250.0, -6.0)), &Tolerances::default());
        assert_eq!(signals(&events), vec![("crab".to_string(), Signal::Touched)]);
    }

    #[test]
    fn side_contact_blocks_and_touches() {
        let events = classify(&CollisionPair::new(player(305.0, 0.0), crab(300.0)), &Tolerances::default());
        assert_eq!(
            signals(&events),
            vec![
                ("crab".to_string(), Signal::Blocked),
                ("crab".to_string(), Signal::Touched)
            ]
        );
    }

    //--- Terrain contacts -------------------------------------------------

    #[test]
    fn wall_within_tolerance_blocks() {
        let wall = BodyInfo::new(EntityId(9), "ground", BodyLabel::Ground, (160.0, 310.0));
        let events = classify(&CollisionPair::new(crab(300.0), wall), &Tolerances::default());
        assert_eq!(signals(&events), vec![("crab".to_string(), Signal::Blocked)]);
    }

    #[test]
    fn floor_below_is_ignored() {
        let floor = BodyInfo::new(EntityId(9), "ground", BodyLabel::Ground, (100.0, 364.0));
        assert!(classify(&CollisionPair::new(crab(300.0), floor), &Tolerances::default()).is_empty());
    }

    //--- Projectiles ------------------------------------------------------

    #[test]
    fn projectile_always_touches() {
        let ball = BodyInfo::new(EntityId(5), "fireball-5", BodyLabel::Projectile, (90.0, 100.0));
        let floor = BodyInfo::new(EntityId(9), "ground", BodyLabel::Ground, (100.0, 364.0));
        let events = classify(&CollisionPair::new(floor, ball), &Tolerances::default());

        assert_eq!(signals(&events), vec![("fireball-5".to_string(), Signal::Touched)]);
        assert_eq!(events[0].other_label(), Some(BodyLabel::Ground));
    }
}

//=========================================================================
// Factory
//=========================================================================
//
// Builds managed entities from level object records.
//
// The host parses its level file and hands over one `MapObject` per
// placed object. The object name's leading word picks the archetype
// (`bat`, `crab-3`, `tnt_east`, ...); each instance gets a unique
// `<kind>-<id>` name, which is also its event topic namespace.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, CreatureBehavior};
use super::bat::Bat;
use super::bomb::Bomb;
use super::crab::Crab;
use super::crow::Crow;
use super::dragon::Dragon;
use super::firewalker::FireWalker;
use super::flower::Flower;
use super::fly::Fly;
use super::plant::Plant;
use super::skin_switch::SkinSwitch;
use super::tnt::Tnt;
use super::water::Water;
use super::zeppelin::Zeppelin;
use crate::core::entity::Entity;
use crate::core::stage::Stage;
use crate::error::{BehaviorError, Result};
use crate::world::{BodyLabel, Sprite};

const DEFAULT_SIZE: f32 = 64.0;

//=== MapObject ===========================================================

/// One placed object from the level's object layer. `x`/`y` is the
/// top-left corner in world pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Remote blast point for TNT.
    #[serde(default)]
    pub target: Option<(f32, f32)>,
}

impl MapObject {
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
            target: None,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_target(mut self, x: f32, y: f32) -> Self {
        self.target = Some((x, y));
        self
    }

    /// Leading alphabetic word of the name, lowercased.
    pub fn kind(&self) -> String {
        self.name
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase()
    }

    fn size(&self) -> (f32, f32) {
        let w = if self.width > 0.0 { self.width } else { DEFAULT_SIZE };
        let h = if self.height > 0.0 { self.height } else { DEFAULT_SIZE };
        (w, h)
    }

    fn center(&self) -> (f32, f32) {
        let (w, h) = self.size();
        (self.x + w / 2.0, self.y + h / 2.0)
    }
}

//=== Stage::spawn ========================================================

impl Stage {
    /// Builds the entity for `object`. Unknown names are an error so the
    /// caller can decide whether a level is usable.
    pub fn spawn(&self, object: &MapObject) -> Result<Entity> {
        let kind = object.kind();
        let label = match kind.as_str() {
            "tnt" | "water" | "changeskin" => BodyLabel::Object,
            _ => BodyLabel::Creature,
        };

        let make_sprite = || {
            let id = self.next_id();
            let name = format!("{}-{}", kind, id.raw());
            let (cx, cy) = object.center();
            let (w, h) = object.size();
            let mut sprite = Sprite::new(id, &name, label, cx, cy, w, h);
            if matches!(kind.as_str(), "bat" | "crow" | "zeppelin" | "fly") {
                sprite.set_ignore_gravity(true);
            }
            sprite.into_ref()
        };

        let entity = match kind.as_str() {
            "bat" => creature(self, Bat::new(self, make_sprite()))?,
            "crow" => creature(self, Crow::new(self, make_sprite()))?,
            "zeppelin" => creature(self, Zeppelin::new(self, make_sprite()))?,
            "firewalker" => creature(self, FireWalker::new(self, make_sprite()))?,
            "crab" => creature(self, Crab::new(self, make_sprite()))?,
            "dragon" => creature(self, Dragon::new(self, make_sprite()))?,
            "fly" => creature(self, Fly::new(self, make_sprite()))?,
            "bomb" => creature(self, Bomb::new(self, make_sprite()))?,
            "plant" => creature(self, Plant::new(self, make_sprite()))?,
            "flower" => creature(self, Flower::new(self, make_sprite()))?,
            "tnt" => controller(self, Tnt::new(self, make_sprite(), object.target))?,
            "water" => controller(self, Water::new(self, make_sprite()))?,
            "changeskin" => Entity::static_object(SkinSwitch::new(self, make_sprite())),
            _ => {
                warn!(target: "creature", "No archetype for map object {:?}", object.name);
                return Err(BehaviorError::UnknownObject(object.name.clone()));
            }
        };

        debug!(target: "creature", "Map object {:?} became {} {}", object.name, entity.kind(), entity.name());
        Ok(entity)
    }
}

fn creature<B: CreatureBehavior>(stage: &Stage, body: B) -> Result<Entity> {
    Ok(Entity::creature(Actor::new(stage, body)?))
}

fn controller<B: Behavior>(stage: &Stage, body: B) -> Result<Entity> {
    Ok(Entity::controller(Actor::new(stage, body)?))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creatures::fixtures;

    #[test]
    fn kind_is_leading_word() {
        assert_eq!(MapObject::new("Crab-3", 0.0, 0.0).kind(), "crab");
        assert_eq!(MapObject::new("tnt_east", 0.0, 0.0).kind(), "tnt");
        assert_eq!(MapObject::new("fly", 0.0, 0.0).kind(), "fly");
    }

    #[test]
    fn creatures_controllers_and_statics_are_sorted() {
        let stage = fixtures::open_stage();

        let bat = stage.spawn(&MapObject::new("bat", 0.0, 0.0)).unwrap();
        let tnt = stage.spawn(&MapObject::new("tnt", 0.0, 0.0)).unwrap();
        let switch = stage.spawn(&MapObject::new("changeskin", 0.0, 0.0)).unwrap();

        assert_eq!(bat.kind(), "creature");
        assert_eq!(tnt.kind(), "controller");
        assert_eq!(switch.kind(), "static");
    }

    #[test]
    fn sprite_is_centred_on_object() {
        let stage = fixtures::open_stage();
        let entity = stage
            .spawn(&MapObject::new("crab", 100.0, 50.0).with_size(64.0, 32.0))
            .unwrap();

        let sprite = entity.sprite().unwrap();
        let sprite = sprite.borrow();
        assert_eq!(sprite.position(), (132.0, 66.0));
        assert_eq!(sprite.size(), (64.0, 32.0));
        assert_eq!(sprite.name(), entity.name());
        assert!(entity.name().starts_with("crab-"));
    }

    #[test]
    fn flyers_ignore_gravity() {
        let stage = fixtures::open_stage();
        let fly = stage.spawn(&MapObject::new("fly", 0.0, 0.0)).unwrap();
        let crab = stage.spawn(&MapObject::new("crab", 0.0, 0.0)).unwrap();

        assert!(fly.sprite().unwrap().borrow().ignores_gravity());
        assert!(!crab.sprite().unwrap().borrow().ignores_gravity());
    }

    #[test]
    fn instance_names_are_unique() {
        let stage = fixtures::open_stage();
        let a = stage.spawn(&MapObject::new("bat", 0.0, 0.0)).unwrap();
        let b = stage.spawn(&MapObject::new("bat", 0.0, 0.0)).unwrap();
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn unknown_object_is_rejected() {
        let stage = fixtures::open_stage();
        let err = stage.spawn(&MapObject::new("unicorn", 0.0, 0.0)).err().unwrap();
        assert!(matches!(err, BehaviorError::UnknownObject(name) if name == "unicorn"));
    }

    #[test]
    fn deserializes_from_toml() {
        let object: MapObject = toml::from_str("name = \"tnt\"\nx = 10.0\ny = 20.0\ntarget = [300.0, 40.0]\n").unwrap();
        assert_eq!(object.target, Some((300.0, 40.0)));
        assert_eq!(object.width, 0.0);
    }
}

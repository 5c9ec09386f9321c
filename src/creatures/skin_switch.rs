//=========================================================================
// SkinSwitch
//=========================================================================
//
// Static level object that swaps the player's skin on every touch.
// Never updated by the manager; it only listens for contacts.
//
//=========================================================================

use std::rc::Rc;

use log::{debug, warn};

use super::proximity::PlayerTracker;
use crate::core::entity::StaticObject;
use crate::core::event_bus::{Event, EventBus, Handler, Signal, Subscriptions, Topic};
use crate::core::stage::Stage;
use crate::error::Result;
use crate::world::{BodyLabel, EntityId, SpriteRef};

pub struct SkinSwitch {
    id: EntityId,
    name: String,
    sprite: Option<SpriteRef>,
    subs: Subscriptions,
    bus: EventBus,
}

impl SkinSwitch {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let (id, name) = {
            let sprite = sprite.borrow();
            (sprite.id(), sprite.name().to_string())
        };

        let bus = stage.bus().clone();
        let mut subs = Subscriptions::new(id);
        let topic = Topic::new(name.as_str(), Signal::Touched);
        subs.on(&bus, topic, toggle_on_touch(id, PlayerTracker::new(stage.player())));

        debug!(target: "creature", "Spawned skin switch {} ({})", name, id);
        Self {
            id,
            name,
            sprite: Some(sprite),
            subs,
            bus,
        }
    }

    pub fn is_listening(&self) -> bool {
        !self.subs.is_empty()
    }
}

fn toggle_on_touch(id: EntityId, player: PlayerTracker) -> Handler {
    Rc::new(move |event: &Event| -> Result<()> {
        if event.source != id || event.other_label() != Some(BodyLabel::Player) {
            return Ok(());
        }
        if !player.toggle_skin() {
            warn!(target: "creature", "Skin switch {} touched but player unavailable", id);
        }
        Ok(())
    })
}

impl StaticObject for SkinSwitch {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn destroy(&mut self) {
        self.subs.release(&self.bus);
        if let Some(sprite) = self.sprite.take() {
            if let Ok(mut sprite) = sprite.try_borrow_mut() {
                sprite.destroy();
            }
        }
    }

    fn sprite(&self) -> Option<SpriteRef> {
        self.sprite.clone()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creatures::fixtures;

    fn touch(stage: &Stage, switch: &SkinSwitch) -> usize {
        let event = Event::contact(switch.name(), Signal::Touched, switch.id(), fixtures::PLAYER_ID, BodyLabel::Player);
        stage.bus().emit(&event)
    }

    #[test]
    fn each_touch_toggles_skin() {
        let (stage, player) = fixtures::stage_with_player(&fixtures::FLOOR_ROWS, 0.0, 0.0);
        let sprite = stage.sprite("changeskin-1", BodyLabel::Object, (64.0, 160.0), (64.0, 64.0));
        let switch = SkinSwitch::new(&stage, sprite);

        touch(&stage, &switch);
        assert!(player.borrow().has_alternate_skin());
        touch(&stage, &switch);
        assert!(!player.borrow().has_alternate_skin());
    }

    #[test]
    fn destroy_stops_listening() {
        let (stage, player) = fixtures::stage_with_player(&fixtures::FLOOR_ROWS, 0.0, 0.0);
        let sprite = stage.sprite("changeskin-2", BodyLabel::Object, (64.0, 160.0), (64.0, 64.0));
        let mut switch = SkinSwitch::new(&stage, sprite);

        switch.destroy();
        switch.destroy();
        assert!(!switch.is_listening());
        assert!(switch.sprite().is_none());
        assert_eq!(touch(&stage, &switch), 0);
        assert!(!player.borrow().has_alternate_skin());
    }
}

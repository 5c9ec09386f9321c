//=========================================================================
// Topics and Events
//=========================================================================
//
// Structured addressing for the event bus.
//
// A topic pairs an entity's instance name with a signal kind. It renders
// as the legacy "<name>-<signal>" string the physics layer speaks, and
// parses back from it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::str::FromStr;

//=== Internal Dependencies ===============================================

use crate::error::BehaviorError;
use crate::world::{BodyLabel, EntityId};

//=== Signal ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Hit a wall or obstacle within the vertical tolerance.
    Blocked,
    /// Landed on from above by the player.
    Stomped,
    /// Generic contact, used for switches and projectiles.
    Touched,
    AnimationComplete,
    Timer,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::Blocked,
        Signal::Stomped,
        Signal::Touched,
        Signal::AnimationComplete,
        Signal::Timer,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Signal::Blocked => "blocked",
            Signal::Stomped => "stomped",
            Signal::Touched => "touched",
            Signal::AnimationComplete => "animationcomplete",
            Signal::Timer => "timer",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.suffix() == suffix)
    }
}

//=== Topic ===============================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    name: String,
    signal: Signal,
}

impl Topic {
    pub fn new(name: impl Into<String>, signal: Signal) -> Self {
        Self {
            name: name.into(),
            signal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.signal.suffix())
    }
}

impl FromStr for Topic {
    type Err = BehaviorError;

    /// Instance names may contain dashes; the signal is the last segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, suffix) = s
            .rsplit_once('-')
            .ok_or_else(|| BehaviorError::InvalidTopic(s.to_string()))?;

        if name.is_empty() {
            return Err(BehaviorError::InvalidTopic(s.to_string()));
        }

        let signal =
            Signal::from_suffix(suffix).ok_or_else(|| BehaviorError::InvalidTopic(s.to_string()))?;
        Ok(Topic::new(name, signal))
    }
}

//=== Payload =============================================================

/// Tag identifying which one-shot timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag(pub &'static str);

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    /// The other body of a collision pair.
    Contact { other: EntityId, other_label: BodyLabel },
    /// Name of the animation clip that finished.
    Clip(String),
    Timer(TimerTag),
}

//=== Event ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: Topic,
    /// Entity the event is about. Handlers compare it with their own id.
    pub source: EntityId,
    pub payload: Payload,
}

impl Event {
    pub fn new(topic: Topic, source: EntityId) -> Self {
        Self {
            topic,
            source,
            payload: Payload::None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn contact(name: &str, signal: Signal, source: EntityId, other: EntityId, other_label: BodyLabel) -> Self {
        Self::new(Topic::new(name, signal), source)
            .with_payload(Payload::Contact { other, other_label })
    }

    pub fn animation_complete(name: &str, source: EntityId, clip: &str) -> Self {
        Self::new(Topic::new(name, Signal::AnimationComplete), source)
            .with_payload(Payload::Clip(clip.to_string()))
    }

    pub fn timer(name: &str, source: EntityId, tag: TimerTag) -> Self {
        Self::new(Topic::new(name, Signal::Timer), source).with_payload(Payload::Timer(tag))
    }

    pub fn signal(&self) -> Signal {
        self.topic.signal()
    }

    pub fn clip(&self) -> Option<&str> {
        match &self.payload {
            Payload::Clip(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn timer_tag(&self) -> Option<TimerTag> {
        match self.payload {
            Payload::Timer(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn other_label(&self) -> Option<BodyLabel> {
        match self.payload {
            Payload::Contact { other_label, .. } => Some(other_label),
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //--- Topic ------------------------------------------------------------

    #[test]
    fn topic_renders_legacy_string() {
        assert_eq!(Topic::new("bat-3", Signal::Stomped).to_string(), "bat-3-stomped");
        assert_eq!(
            Topic::new("bomb", Signal::AnimationComplete).to_string(),
            "bomb-animationcomplete"
        );
    }

    #[test]
    fn topic_parses_dashed_names() {
        let topic: Topic = "fire-walker-2-blocked".parse().unwrap();
        assert_eq!(topic.name(), "fire-walker-2");
        assert_eq!(topic.signal(), Signal::Blocked);
    }

    #[test]
    fn malformed_topics_are_rejected() {
        assert!("bat".parse::<Topic>().is_err());
        assert!("-stomped".parse::<Topic>().is_err());
        assert!("bat-exploded".parse::<Topic>().is_err());
    }

    //--- Event ------------------------------------------------------------

    #[test]
    fn payload_accessors() {
        let done = Event::animation_complete("bat", EntityId(1), "dead");
        assert_eq!(done.clip(), Some("dead"));
        assert_eq!(done.timer_tag(), None);

        let hit = Event::contact("bat", Signal::Blocked, EntityId(1), EntityId(2), BodyLabel::Ground);
        assert_eq!(hit.other_label(), Some(BodyLabel::Ground));
        assert_eq!(hit.signal(), Signal::Blocked);
    }
}

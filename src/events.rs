//! Game events and the per-event sound assignments a host binds to them.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Lower bound for a per-event volume multiplier.
pub const MIN_EVENT_VOLUME: f32 = 0.0;
/// Upper bound for a per-event volume multiplier.
pub const MAX_EVENT_VOLUME: f32 = 5.0;
/// Lower bound for a per-event trigger delay in seconds.
pub const MIN_EVENT_DELAY: f32 = 0.0;
/// Upper bound for a per-event trigger delay in seconds.
pub const MAX_EVENT_DELAY: f32 = 5.0;

/// Game moments a sound can be attached to.
///
/// The first three happen at a place on the field and play positioned;
/// the rest are outcomes and play flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Bump,
    Demo,
    Crossbar,
    Win,
    Loss,
    PlayerGoal,
    TeamGoal,
    Concede,
    Save,
    Assist,
}

impl EventKind {
    /// Every kind, in table order.
    pub const ALL: [EventKind; 10] = [
        EventKind::Bump,
        EventKind::Demo,
        EventKind::Crossbar,
        EventKind::Win,
        EventKind::Loss,
        EventKind::PlayerGoal,
        EventKind::TeamGoal,
        EventKind::Concede,
        EventKind::Save,
        EventKind::Assist,
    ];

    /// Whether this event carries a world position worth spatializing.
    pub fn is_spatial(&self) -> bool {
        matches!(self, EventKind::Bump | EventKind::Demo | EventKind::Crossbar)
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Bump => "bump",
            EventKind::Demo => "demo",
            EventKind::Crossbar => "crossbar",
            EventKind::Win => "win",
            EventKind::Loss => "loss",
            EventKind::PlayerGoal => "player goal",
            EventKind::TeamGoal => "team goal",
            EventKind::Concede => "concede",
            EventKind::Save => "save",
            EventKind::Assist => "assist",
        }
    }

    /// Key used for this event in persisted settings.
    pub fn config_key(&self) -> &'static str {
        match self {
            EventKind::PlayerGoal => "playergoal",
            EventKind::TeamGoal => "teamgoal",
            other => other.label(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sound assignment for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSound {
    /// Clip file name, relative to the sound directory. Empty means none.
    pub sound_id: String,
    pub enabled: bool,
    /// Seconds to wait after the event before playing.
    pub delay: f32,
    /// Per-event multiplier on top of the master volume.
    pub volume: f32,
}

impl EventSound {
    /// Builds an assignment, clamping delay and volume into range.
    pub fn new(sound_id: impl Into<String>, enabled: bool, delay: f32, volume: f32) -> Self {
        Self {
            sound_id: sound_id.into(),
            enabled,
            delay: delay.clamp(MIN_EVENT_DELAY, MAX_EVENT_DELAY),
            volume: volume.clamp(MIN_EVENT_VOLUME, MAX_EVENT_VOLUME),
        }
    }

    /// An empty, disabled assignment.
    pub fn disabled() -> Self {
        Self {
            sound_id: String::new(),
            enabled: false,
            delay: 0.0,
            volume: 1.0,
        }
    }
}

/// One [`EventSound`] per [`EventKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventSoundTable([EventSound; 10]);

impl Default for EventSoundTable {
    /// The assignments the plugin ships with. Crossbar has no stock sound
    /// and starts disabled.
    fn default() -> Self {
        Self([
            EventSound::new("bonk.wav", true, 0.0, 1.0),
            EventSound::new("sm64_mario_so_long_bowser.wav", true, 0.0, 1.0),
            EventSound::disabled(),
            EventSound::new("sm64_mario_game_over.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_lost_a_life.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_waha.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_lets_go.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_mamma-mia.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_hoohoo.wav", true, 0.1, 1.0),
            EventSound::new("sm64_mario_haha.wav", true, 0.1, 1.0),
        ])
    }
}

impl EventSoundTable {
    pub fn get(&self, kind: EventKind) -> &EventSound {
        &self.0[kind as usize]
    }

    pub fn get_mut(&mut self, kind: EventKind) -> &mut EventSound {
        &mut self.0[kind as usize]
    }

    pub fn set(&mut self, kind: EventKind, sound: EventSound) {
        self.0[kind as usize] = sound;
    }

    /// Distinct non-empty clip ids across the table, in table order.
    /// This is the set worth preloading.
    pub fn sound_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for sound in &self.0 {
            if !sound.sound_id.is_empty() && !ids.contains(&sound.sound_id.as_str()) {
                ids.push(&sound.sound_id);
            }
        }
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventKind, &EventSound)> {
        EventKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}

impl Index<EventKind> for EventSoundTable {
    type Output = EventSound;

    fn index(&self, kind: EventKind) -> &EventSound {
        self.get(kind)
    }
}

impl IndexMut<EventKind> for EventSoundTable {
    fn index_mut(&mut self, kind: EventKind) -> &mut EventSound {
        self.get_mut(kind)
    }
}

//! Ambient soundscapes for the study page

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientSound {
    Library,
    Cafe,
    Rain,
    Nature,
}

impl AmbientSound {
    pub const ALL: [AmbientSound; 4] = [
        AmbientSound::Library,
        AmbientSound::Cafe,
        AmbientSound::Rain,
        AmbientSound::Nature,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AmbientSound::Library => "library",
            AmbientSound::Cafe => "cafe",
            AmbientSound::Rain => "rain",
            AmbientSound::Nature => "nature",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AmbientSound::Library => "Library",
            AmbientSound::Cafe => "Café",
            AmbientSound::Rain => "Rain",
            AmbientSound::Nature => "Nature",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AmbientSound::Library => "Quiet study ambience",
            AmbientSound::Cafe => "Coffee shop vibes",
            AmbientSound::Rain => "Gentle rainfall",
            AmbientSound::Nature => "Forest sounds",
        }
    }

    /// Video id of the looping stream
    pub fn stream_id(&self) -> &'static str {
        match self {
            AmbientSound::Library => "jfKfPfyJRdk",
            AmbientSound::Cafe => "5qap5aO4i9A",
            AmbientSound::Rain => "q76bMs-NwRk",
            AmbientSound::Nature => "eKFTSSKCzWA",
        }
    }
}

impl fmt::Display for AmbientSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AmbientSound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        AmbientSound::ALL
            .into_iter()
            .find(|sound| sound.id() == s)
            .ok_or_else(|| format!("unknown ambient sound '{}'", s))
    }
}

/// Playback state of the soundscape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientPlayer {
    pub selected: AmbientSound,
    /// 0 - 100
    pub volume: u8,
    pub playing: bool,
}

impl AmbientPlayer {
    pub fn new(selected: AmbientSound, volume: u8) -> Self {
        Self {
            selected,
            volume: volume.min(100),
            playing: false,
        }
    }

    /// Switch soundscape; selecting always starts playback
    pub fn select(&mut self, sound: AmbientSound) {
        self.selected = sound;
        self.playing = true;
    }

    /// Flip playback and return the new state
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }
}

impl Default for AmbientPlayer {
    fn default() -> Self {
        Self::new(AmbientSound::Library, 50)
    }
}

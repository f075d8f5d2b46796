use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::ambient::{AmbientPlayer, AmbientSound};
use crate::audio::{AudioInputConfig, AudioSource};
use crate::focus::FocusTimerConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub focus: FocusSettings,
    #[serde(default)]
    pub voice: VoiceSettings,
    #[serde(default)]
    pub ambient: AmbientSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FocusSettings {
    pub focus_minutes: u64,
    pub break_minutes: u64,
    pub notifications: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
            notifications: true,
        }
    }
}

impl FocusSettings {
    pub fn timer_config(&self) -> FocusTimerConfig {
        FocusTimerConfig {
            notifications: self.notifications,
            ..FocusTimerConfig::from_minutes(self.focus_minutes, self.break_minutes)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Base URL of the voice-note backend
    pub api_base_url: String,
    /// Bearer credential attached to backend requests
    pub api_token: Option<String>,
    pub chunk_interval_ms: u64,
    /// WAV file replayed as the capture source instead of a microphone
    pub input_file: Option<String>,
    /// Pace file input at real time
    pub realtime: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: None,
            chunk_interval_ms: 1000,
            input_file: None,
            realtime: true,
        }
    }
}

impl VoiceSettings {
    pub fn input_config(&self) -> AudioInputConfig {
        AudioInputConfig {
            chunk_interval_ms: self.chunk_interval_ms,
            realtime: self.realtime,
        }
    }

    pub fn source(&self) -> AudioSource {
        match &self.input_file {
            Some(path) => AudioSource::File(PathBuf::from(path)),
            None => AudioSource::Microphone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AmbientSettings {
    pub default_sound: String,
    pub volume: u8,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            default_sound: "library".to_string(),
            volume: 50,
        }
    }
}

impl AmbientSettings {
    pub fn player(&self) -> Result<AmbientPlayer> {
        let sound: AmbientSound = self
            .default_sound
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid ambient.default_sound")?;
        Ok(AmbientPlayer::new(sound, self.volume))
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SMARTSTUDY").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}

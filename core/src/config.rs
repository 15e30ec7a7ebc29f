use serde::Deserialize;

use crate::color::Color;
use crate::error::BoardError;
use crate::slot_id::SlotId;

pub const AMBIENT_TARGET_DEFAULT: usize = 15;
pub const AMBIENT_TARGET_MAX: usize = 200;
pub const RAY_COUNT_DEFAULT: usize = 8;
pub const RAY_COUNT_MAX: usize = 64;
pub const DUST_COUNT_DEFAULT: usize = 20;
pub const DUST_COUNT_MAX: usize = 200;

/// A connection installed when the board starts.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConnectionSeed {
    pub from: SlotId,
    pub to: SlotId,
    #[serde(default = "default_seed_color")]
    pub color: Color,
    #[serde(default = "default_true")]
    pub animated: bool,
}

impl ConnectionSeed {
    pub fn new(from: &str, to: &str, color: Color) -> Self {
        Self {
            from: SlotId::from(from),
            to: SlotId::from(to),
            color,
            animated: true,
        }
    }
}

fn default_seed_color() -> Color {
    Color::OXBLOOD
}

fn default_true() -> bool {
    true
}

pub fn default_connections() -> Vec<ConnectionSeed> {
    vec![
        ConnectionSeed::new("photo1", "photo2", Color::OXBLOOD),
        ConnectionSeed::new("photo2", "photo3", Color::OXBLOOD),
        ConnectionSeed::new("photo1", "photo4", Color::GOLD),
        ConnectionSeed::new("photo5", "photo6", Color::OXBLOOD),
        ConnectionSeed::new("photo1", "photo1", Color::OXBLOOD),
    ]
}

/// Tunables for the board. Every field has a default, so a partial JSON
/// object only overrides what it names.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub ambient_target: usize,
    pub ambient_spawn_ms: u32,
    pub ambient_seed_stagger_ms: u32,
    pub refresh_period_ms: u32,
    pub resize_debounce_ms: u32,
    pub ray_count: usize,
    pub ray_length_pct: f64,
    pub ray_lifetime_ms: u32,
    pub reveal_ms: u32,
    pub click_burst: usize,
    pub reveal_burst: usize,
    pub burst_lifetime_ms: u32,
    pub dust_interval_ms: u32,
    pub dust_count: usize,
    pub dust_lifetime_ms: u32,
    pub selection_glow_ms: u32,
    pub update_flash_ms: u32,
    pub banner_ms: u32,
    pub welcome_ms: u32,
    pub pulse_chance: f64,
    pub pulse_window_ms: u32,
    pub pulse_ms: u32,
    pub interactive: bool,
    pub connections: Vec<ConnectionSeed>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            ambient_target: AMBIENT_TARGET_DEFAULT,
            ambient_spawn_ms: 1000,
            ambient_seed_stagger_ms: 200,
            refresh_period_ms: 1000,
            resize_debounce_ms: 100,
            ray_count: RAY_COUNT_DEFAULT,
            ray_length_pct: 15.0,
            ray_lifetime_ms: 800,
            reveal_ms: 1000,
            click_burst: 8,
            reveal_burst: 12,
            burst_lifetime_ms: 800,
            dust_interval_ms: 30_000,
            dust_count: DUST_COUNT_DEFAULT,
            dust_lifetime_ms: 25_000,
            selection_glow_ms: 2000,
            update_flash_ms: 600,
            banner_ms: 2000,
            welcome_ms: 3000,
            pulse_chance: 0.3,
            pulse_window_ms: 5000,
            pulse_ms: 2000,
            interactive: false,
            connections: default_connections(),
        }
    }
}

impl BoardConfig {
    pub fn from_json(text: &str) -> Result<Self, BoardError> {
        let mut config: Self = serde_json::from_str(text)
            .map_err(|err| BoardError::invalid(format!("board config: {err}")))?;
        config.clamp_counts();
        Ok(config)
    }

    /// Caps the counts that size spawn loops.
    pub fn clamp_counts(&mut self) {
        self.ambient_target = self.ambient_target.min(AMBIENT_TARGET_MAX);
        self.ray_count = self.ray_count.min(RAY_COUNT_MAX);
        self.dust_count = self.dust_count.min(DUST_COUNT_MAX);
    }

    /// Applies `?particles=20&rays=12&dust=0&interactive=1` style overrides.
    /// Unknown keys and unparsable values are ignored.
    pub fn apply_query(&mut self, search: &str) {
        let raw = search.trim().trim_start_matches('?');
        for pair in raw.split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (pair.trim(), ""),
            };
            match key {
                "particles" => {
                    if let Ok(count) = value.parse::<usize>() {
                        self.ambient_target = count;
                    }
                }
                "rays" => {
                    if let Ok(count) = value.parse::<usize>() {
                        self.ray_count = count;
                    }
                }
                "dust" => {
                    if let Ok(count) = value.parse::<usize>() {
                        self.dust_count = count;
                    }
                }
                "interactive" => {
                    if let Some(flag) = parse_flag(value) {
                        self.interactive = flag;
                    }
                }
                _ => {}
            }
        }
        self.clamp_counts();
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

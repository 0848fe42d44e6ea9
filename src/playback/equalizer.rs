//! Ten-band equalizer gains. The filtering itself belongs to the engine.

pub const BANDS: usize = 10;
pub const MIN_GAIN_DB: f32 = -20.0;
pub const MAX_GAIN_DB: f32 = 20.0;

/// Centre frequency labels, lowest band first.
pub const BAND_LABELS: [&str; BANDS] = [
    "60", "170", "310", "600", "1k", "3k", "6k", "12k", "14k", "16k",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Preset {
    Flat,
    Rock,
    Pop,
    Jazz,
    Classical,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Flat,
        Preset::Rock,
        Preset::Pop,
        Preset::Jazz,
        Preset::Classical,
    ];

    pub fn gains(self) -> [f32; BANDS] {
        match self {
            Preset::Flat => [0.0; BANDS],
            Preset::Rock => [5.0, 4.0, -1.0, -3.0, -1.0, 1.0, 3.0, 4.0, 4.0, 4.0],
            Preset::Pop => [-1.0, 2.0, 4.0, 4.0, 3.0, 0.0, -1.0, -1.0, -1.0, -1.0],
            Preset::Jazz => [3.0, 2.0, 1.0, 2.0, -1.0, -1.0, 0.0, 1.0, 2.0, 3.0],
            Preset::Classical => [4.0, 3.0, 2.0, 1.0, -1.0, -1.0, -1.0, 0.0, 2.0, 3.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Flat => "Flat",
            Preset::Rock => "Rock",
            Preset::Pop => "Pop",
            Preset::Jazz => "Jazz",
            Preset::Classical => "Classical",
        }
    }

    pub fn cycle(self) -> Self {
        let pos = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equalizer {
    gains: [f32; BANDS],
    preset: Option<Preset>,
}

impl Default for Equalizer {
    fn default() -> Self {
        Self {
            gains: [0.0; BANDS],
            preset: Some(Preset::Flat),
        }
    }
}

impl Equalizer {
    /// Set one band, clamped to the supported range. Returns the stored gain,
    /// or `None` for an out-of-range band.
    pub fn set_band(&mut self, band: usize, gain_db: f32) -> Option<f32> {
        let slot = self.gains.get_mut(band)?;
        *slot = gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB);
        self.preset = None;
        Some(*slot)
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.gains = preset.gains();
        self.preset = Some(preset);
    }

    pub fn gains(&self) -> &[f32; BANDS] {
        &self.gains
    }

    /// The preset the gains came from, if they were not edited since.
    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }
}

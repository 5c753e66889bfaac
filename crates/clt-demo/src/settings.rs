use dice::{Area, ConvolutionEngine, SimulationEngine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Common slider metadata so bounds live in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl SliderRange {
    pub const fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }
}

pub const FACE_RANGE: SliderRange = SliderRange::new(0, 100, 1);
pub const MAX_DICE_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theory: TheorySettings,
    pub simulation: SimulationSettings,
    pub dice: DiceSettings,
}

/// The convolution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheorySettings {
    /// Whole graph, margins included.
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    /// Share of the plot height the tallest bar reaches.
    pub headroom: f64,
    pub trim_tolerance: f64,
    pub trim_min_dice: u32,
}

impl Default for TheorySettings {
    fn default() -> Self {
        Self {
            width: 450.0,
            height: 325.0,
            margins: Margins::new(25.0, 25.0, 10.0, 25.0),
            headroom: 0.75,
            trim_tolerance: 1.0,
            trim_min_dice: 5,
        }
    }
}

/// The roll chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub width: f32,
    /// Height the boxes are sized for; a lucky run may grow past it.
    pub viewing_height: f32,
    pub margins: Margins,
    pub box_height_min: f64,
    pub box_height_max_fraction: f64,
    pub rolls_per_second: f64,
    pub default_roll_count: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            width: 996.0,
            viewing_height: 630.0,
            margins: Margins::new(100.0, 75.0, 50.0, 50.0),
            box_height_min: 2.0,
            box_height_max_fraction: 0.08,
            rolls_per_second: 64.0,
            default_roll_count: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceSettings {
    pub default_dice: u32,
    pub max_dice: u32,
}

impl Default for DiceSettings {
    fn default() -> Self {
        Self {
            default_dice: 1,
            max_dice: MAX_DICE_LIMIT,
        }
    }
}

impl Settings {
    pub fn theory_area(&self) -> Area {
        let t = &self.theory;
        Area::new(
            (t.width - t.margins.left - t.margins.right) as f64,
            (t.height - t.margins.top - t.margins.bottom) as f64,
        )
    }

    pub fn simulation_area(&self) -> Area {
        let s = &self.simulation;
        Area::new(
            (s.width - s.margins.left - s.margins.right) as f64,
            s.viewing_height as f64,
        )
    }

    pub fn convolution_engine(&self) -> ConvolutionEngine {
        ConvolutionEngine::new(
            self.theory.trim_tolerance,
            self.theory.trim_min_dice,
        )
    }

    pub fn simulation_engine(&self) -> SimulationEngine {
        SimulationEngine {
            area: self.simulation_area(),
            box_height_min: self.simulation.box_height_min,
            box_height_max_fraction: self.simulation.box_height_max_fraction,
        }
    }

    /// Largest dice count the editor accepts, at least 1.
    pub fn max_dice(&self) -> u32 {
        self.dice.max_dice.clamp(1, MAX_DICE_LIMIT)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let json_str = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;
        serde_json::from_str(&json_str)
            .map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Settings from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!("{}. Using default settings.", e);
                Self::default()
            }
        }
    }
}

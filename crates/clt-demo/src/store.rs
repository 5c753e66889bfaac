use dice::convolution;
use dice::{
    BarChart, Canvas, ConvolutionResult, DiceError, DiceResult, Distribution,
    DistributionModel, Face, Point, Presets, RollChart, Scene,
    SelectionCoordinator, SimulationState, SimulationView,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::serialization::{self, SerializableState};
use crate::settings::Settings;
use crate::versioned::Versioned;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveTab {
    Charts,
    RollLog,
}

/// Which chart a click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Theory,
    Simulation,
}

/// Live convolution and its laid-out bars.
pub struct Theory {
    pub result: ConvolutionResult,
    pub bars: BarChart,
}

/// A simulation and everything drawn for it.
pub struct Run {
    pub state: SimulationState,
    pub chart: RollChart,
    pub scene: Scene,
}

pub struct Store {
    pub settings: Settings,
    pub presets: Presets,
    pub model: Versioned<DistributionModel>,
    pub dice: Versioned<u32>,
    pub dice_input: String,
    pub roll_count_input: String,
    pub theory: Option<Theory>,
    pub theory_scene: Scene,
    pub run: Option<Run>,
    pub selection: SelectionCoordinator,
    /// Rolls that landed in the selected bin since it was selected.
    pub selected_hits: u64,
    pub paused: bool,
    pub active_tab: ActiveTab,
    pub error_message: Option<String>,
    rng: StdRng,
}

impl Store {
    pub fn new(settings: Settings, saved: Option<SerializableState>) -> Self {
        let (distribution, dice) = match saved {
            Some(state) => (state.faces, state.dice),
            None => (Distribution::default(), settings.dice.default_dice),
        };
        Self::with_rng(settings, distribution, dice, StdRng::from_os_rng())
    }

    pub fn with_rng(
        settings: Settings,
        distribution: Distribution,
        dice: u32,
        rng: StdRng,
    ) -> Self {
        let dice = dice.clamp(1, settings.max_dice());
        let roll_count_input =
            settings.simulation.default_roll_count.to_string();
        let mut store = Self {
            settings,
            presets: Presets::default(),
            model: Versioned::new(DistributionModel::new(distribution)),
            dice: Versioned::new(dice),
            dice_input: dice.to_string(),
            roll_count_input,
            theory: None,
            theory_scene: Scene::new(),
            run: None,
            selection: SelectionCoordinator::new(),
            selected_hits: 0,
            paused: false,
            active_tab: ActiveTab::Charts,
            error_message: None,
            rng,
        };
        store.refresh_theory();
        store
    }

    pub fn distribution(&self) -> Distribution {
        self.model.get().distribution()
    }

    /// Surface a rejected input as a transient notification.
    pub fn report(&mut self, error: impl fmt::Display) {
        warn!("{}", error);
        self.error_message = Some(error.to_string());
    }

    /// Whether the running simulation still describes the editor.
    pub fn views_match(&self) -> bool {
        match (&self.run, &self.theory) {
            (Some(run), Some(theory)) => dice::views_match(
                &run.state,
                &self.distribution(),
                *self.dice.get(),
                &theory.result,
            ),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn move_slider(&mut self, face: Face, value: u32) {
        let mut model = self.model.get().clone();
        match model.set_face(face, value) {
            Ok(distribution) if distribution == self.distribution() => {}
            Ok(_) => {
                self.model.set(model);
                self.refresh_theory();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_lock(&mut self, face: Face) {
        let locked = self.model.get_mut().toggle_lock(face);
        debug!(%face, locked, "lock toggled");
    }

    pub fn apply_preset(&mut self, name: &str) {
        match self.presets.get(name) {
            Some(distribution) => {
                self.model.get_mut().apply_preset(distribution);
                self.refresh_theory();
            }
            None => self.report(format!("Unknown preset '{}'", name)),
        }
    }

    pub fn add_preset(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.report("A preset needs a name");
            return;
        }
        self.presets.add(name, self.distribution());
        info!(name, "preset saved");
    }

    pub fn randomize(&mut self) {
        let mut model = self.model.get().clone();
        match model.randomize(&mut self.rng) {
            Ok(_) => {
                self.model.set(model);
                self.refresh_theory();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn set_dice(&mut self, dice: u32) {
        let dice = dice.clamp(1, self.settings.max_dice());
        self.dice_input = dice.to_string();
        if dice != *self.dice.get() {
            self.dice.set(dice);
            self.refresh_theory();
        }
    }

    /// Recompute the convolution and redraw its chart. Any selection
    /// is dropped first since it compared against the old one.
    fn refresh_theory(&mut self) {
        self.deselect_all();

        let distribution = self.distribution();
        let dice = *self.dice.get();
        match convolution::convolve(&distribution, dice) {
            Ok(result) => {
                let mut bars = BarChart::layout(
                    &result,
                    self.settings.theory_area(),
                    &self.settings.convolution_engine(),
                    self.settings.theory.headroom,
                );
                self.theory_scene.erase();
                bars.draw(&mut self.theory_scene);
                self.theory = Some(Theory { result, bars });
            }
            Err(e) => self.report(e),
        }
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    pub fn start_simulation(&mut self, roll_budget: u64) {
        let Some(theory) = &self.theory else {
            self.report("Nothing to simulate yet");
            return;
        };
        let engine = self.settings.simulation_engine();
        let state =
            match engine.start_from(theory.result.clone(), roll_budget) {
                Ok(state) => state,
                Err(e) => {
                    self.report(e);
                    return;
                }
            };

        self.deselect_all();
        let chart = RollChart::new(&state, engine.area);
        let mut scene = Scene::new();
        chart.draw_axes(&mut scene);
        self.run = Some(Run {
            state,
            chart,
            scene,
        });
        self.paused = false;
    }

    /// Make one roll of the running simulation.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        let matches = self.views_match();
        let result = match self.run.as_mut() {
            Some(run) if !run.state.is_finished() => {
                run.state.roll_dice(&mut self.rng).map(|roll| roll.sum)
            }
            _ => return,
        };
        match result {
            Ok(_) => {}
            // Logged by the simulation; the run goes on.
            Err(DiceError::OutcomeOutOfRange { .. }) => return,
            Err(e) => {
                self.report(e);
                return;
            }
        }

        let Some(run) = self.run.as_mut() else {
            return;
        };
        let Some(index) = run.state.current_index() else {
            return;
        };
        run.chart.draw_roll(&mut run.scene, &run.state, index);
        let mut view = SimulationView {
            canvas: &mut run.scene,
            chart: &run.chart,
            state: &run.state,
            matches,
        };
        if self.selection.roll_added(&mut view) {
            self.selected_hits += 1;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.paused
            && self.run.as_ref().is_some_and(|run| !run.state.is_finished())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_bin(&mut self, outcome: u32) {
        let matches = self.views_match();
        let Some(theory) = self.theory.as_ref() else {
            return;
        };
        let mut view = self.run.as_mut().map(|run| SimulationView {
            canvas: &mut run.scene,
            chart: &run.chart,
            state: &run.state,
            matches,
        });
        self.selection.select_bin(
            outcome,
            &mut self.theory_scene,
            &theory.bars,
            view.as_mut(),
        );
        self.selected_hits = 0;
    }

    pub fn deselect_all(&mut self) {
        let matches = self.views_match();
        let mut view = self.run.as_mut().map(|run| SimulationView {
            canvas: &mut run.scene,
            chart: &run.chart,
            state: &run.state,
            matches,
        });
        self.selection
            .deselect_all(&mut self.theory_scene, view.as_mut());
        self.selected_hits = 0;
    }

    /// Select what is under `at`, or clear the selection when that
    /// is nothing or the already selected bin.
    pub fn click(&mut self, surface: Surface, at: Point) {
        let outcome = match surface {
            Surface::Theory => {
                self.theory.as_ref().and_then(|t| t.bars.bar_at(at))
            }
            Surface::Simulation => self.run.as_ref().and_then(|run| {
                run.chart
                    .roll_at(&run.state, at)
                    .and_then(|i| run.state.roll(i))
                    .map(|roll| roll.sum)
            }),
        };
        match outcome {
            Some(o) if self.selection.selected() != Some(o) => {
                self.select_bin(o)
            }
            _ => self.deselect_all(),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn to_serializable(&self) -> SerializableState {
        SerializableState {
            faces: self.distribution(),
            dice: *self.dice.get(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        serialization::save_to_file(&self.to_serializable(), path)?;
        info!(path = %path.display(), "saved");
        Ok(())
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), String> {
        let state = serialization::load_from_file(path)?;
        self.model.set(DistributionModel::new(state.faces));
        let dice = state.dice.clamp(1, self.settings.max_dice());
        self.dice.set(dice);
        self.dice_input = dice.to_string();
        self.refresh_theory();
        info!(path = %path.display(), "loaded");
        Ok(())
    }
}

// ------------------------------------------------------------------
// Input parsing
// ------------------------------------------------------------------

/// Dice count from user text, clamped to `1..=max`.
pub fn parse_dice(text: &str, max: u32) -> DiceResult<u32> {
    let text = text.trim();
    let n: i64 = text.parse().map_err(|_| {
        DiceError::InvalidDiceCount(format!("'{}' is not a whole number", text))
    })?;
    Ok(n.clamp(1, i64::from(max)) as u32)
}

/// Roll budget from user text; must be a whole number of at least 1.
pub fn parse_roll_count(text: &str) -> DiceResult<u64> {
    let text = text.trim();
    let n: i64 = text.parse().map_err(|_| {
        DiceError::InvalidRollCount(format!("'{}' is not a whole number", text))
    })?;
    if n < 1 {
        return Err(DiceError::InvalidRollCount(format!(
            "{}, at least one roll is needed",
            n
        )));
    }
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dice() {
        assert_eq!(parse_dice(" 12 ", 200), Ok(12));
        assert_eq!(parse_dice("0", 200), Ok(1));
        assert_eq!(parse_dice("-4", 200), Ok(1));
        assert_eq!(parse_dice("5000", 200), Ok(200));
        assert!(matches!(
            parse_dice("2.5", 200),
            Err(DiceError::InvalidDiceCount(_))
        ));
        assert!(matches!(
            parse_dice("", 200),
            Err(DiceError::InvalidDiceCount(_))
        ));
    }

    #[test]
    fn test_parse_roll_count() {
        assert_eq!(parse_roll_count("100"), Ok(100));
        assert!(matches!(
            parse_roll_count("0"),
            Err(DiceError::InvalidRollCount(_))
        ));
        assert!(matches!(
            parse_roll_count("lots"),
            Err(DiceError::InvalidRollCount(_))
        ));
    }
}

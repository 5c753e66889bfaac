use crate::effects::Effect;
use crate::store::{self, ActiveTab, Store, Surface};
use dice::{Face, Point};
use std::path::PathBuf;

/// Actions that can be dispatched to modify the sandbox state
#[derive(Debug, Clone)]
pub enum Action {
    // Distribution Actions
    /// Drag the slider of one face
    MoveSlider { face: Face, value: u32 },
    /// Pin or release a face
    ToggleLock { face: Face },
    /// Replace the distribution with a named preset
    SelectPreset { name: String },
    /// Remember the current distribution under a name
    AddPreset { name: String },
    /// Draw a random distribution honoring the locks
    Randomize,

    // Dice Actions
    /// Commit the dice count text field
    SetDiceInput { text: String },
    /// Up/down buttons next to the dice count
    StepDice { delta: i32 },

    // Simulation Actions
    /// Edit the roll count text field
    SetRollCountInput { text: String },
    /// Start a new simulation with the current roll count
    StartSimulation,
    /// Pause or resume the running simulation
    TogglePause,
    /// One roll of the running simulation
    Tick,

    // UI State Actions
    /// A click on one of the two charts, in chart coordinates
    GraphClicked { surface: Surface, at: Point },
    /// Switch between the charts and the roll log
    SetActiveTab { tab: ActiveTab },

    // File Operations
    /// Save distribution and dice count to file
    SaveToFile { path: PathBuf },
    /// Load distribution and dice count from file
    LoadFromFile { path: PathBuf },
    /// Clear any error message
    ClearErrorMessage,
}

/// Apply a single action to modify the store state
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        // Distribution Actions
        Action::MoveSlider { face, value } => {
            store.move_slider(face, value);
            vec![]
        }
        Action::ToggleLock { face } => {
            store.toggle_lock(face);
            vec![]
        }
        Action::SelectPreset { name } => {
            store.apply_preset(&name);
            vec![]
        }
        Action::AddPreset { name } => {
            store.add_preset(&name);
            vec![]
        }
        Action::Randomize => {
            store.randomize();
            vec![]
        }

        // Dice Actions
        Action::SetDiceInput { text } => {
            match store::parse_dice(&text, store.settings.max_dice()) {
                Ok(dice) => store.set_dice(dice),
                Err(e) => store.report(e),
            }
            vec![]
        }
        Action::StepDice { delta } => {
            let dice = (i64::from(*store.dice.get()) + i64::from(delta))
                .clamp(1, i64::from(store.settings.max_dice()));
            store.set_dice(dice as u32);
            vec![]
        }

        // Simulation Actions
        Action::SetRollCountInput { text } => {
            store.roll_count_input = text;
            vec![]
        }
        Action::StartSimulation => {
            match store::parse_roll_count(&store.roll_count_input) {
                Ok(budget) => store.start_simulation(budget),
                Err(e) => store.report(e),
            }
            vec![]
        }
        Action::TogglePause => {
            if store.run.is_some() {
                store.paused = !store.paused;
            }
            vec![]
        }
        Action::Tick => {
            store.tick();
            vec![]
        }

        // UI State Actions
        Action::GraphClicked { surface, at } => {
            store.click(surface, at);
            vec![]
        }
        Action::SetActiveTab { tab } => {
            store.active_tab = tab;
            vec![]
        }

        // File Operations
        Action::SaveToFile { path } => {
            vec![Effect::SaveToFile { path }]
        }
        Action::LoadFromFile { path } => {
            vec![Effect::LoadFromFile { path }]
        }
        Action::ClearErrorMessage => {
            store.error_message = None;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use dice::{Paint, presets};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store_with(distribution: dice::Distribution, dice: u32) -> Store {
        Store::with_rng(
            Settings::default(),
            distribution,
            dice,
            StdRng::seed_from_u64(17),
        )
    }

    fn face(n: u8) -> Face {
        Face::new(n).unwrap()
    }

    fn run(store: &mut Store, actions: Vec<Action>) -> Vec<Effect> {
        actions
            .into_iter()
            .flat_map(|action| update(store, action))
            .collect()
    }

    fn roll_all(store: &mut Store) {
        while store.is_running() {
            update(store, Action::Tick);
        }
    }

    fn theory_outcomes(store: &Store) -> dice::OutcomeRange {
        store.theory.as_ref().unwrap().result.possible_outcomes()
    }

    #[test]
    fn test_initial_state() {
        let store = store_with(presets::FAIR, 1);
        assert_eq!(theory_outcomes(&store), dice::OutcomeRange::for_dice(1));
        assert_eq!(store.theory_scene.count(Paint::Bar), 6);
        assert_eq!(store.roll_count_input, "100");
        assert!(store.run.is_none());
        assert!(!store.views_match());
    }

    #[test]
    fn test_slider_keeps_total() {
        let mut store = store_with(presets::FAIR, 2);
        update(
            &mut store,
            Action::MoveSlider {
                face: face(3),
                value: 60,
            },
        );
        let values = store.distribution().values();
        // The others scale to 8, 8, 8, 7, 7; the residual goes to face 3.
        assert_eq!(values, [8, 8, 62, 8, 7, 7]);
        let result = &store.theory.as_ref().unwrap().result;
        assert_eq!(result.distribution, store.distribution());
    }

    #[test]
    fn test_locked_face_survives_edits() {
        let start = dice::Distribution::new([50, 10, 10, 10, 10, 10]).unwrap();
        let mut store = store_with(start, 1);
        run(
            &mut store,
            vec![
                Action::ToggleLock { face: face(1) },
                Action::MoveSlider {
                    face: face(2),
                    value: 30,
                },
            ],
        );
        let values = store.distribution().values();
        assert_eq!(values, [50, 30, 5, 5, 5, 5]);
        assert_eq!(values[1..].iter().sum::<u32>(), 50);
        assert!(store.error_message.is_none());

        update(
            &mut store,
            Action::MoveSlider {
                face: face(1),
                value: 20,
            },
        );
        assert_eq!(store.distribution().values()[0], 50);
        assert!(store.error_message.is_some());
    }

    #[test]
    fn test_bad_dice_text_changes_nothing() {
        let mut store = store_with(presets::HILL, 3);
        let version = store.dice.version();
        update(
            &mut store,
            Action::SetDiceInput {
                text: "three".to_string(),
            },
        );
        assert_eq!(*store.dice.get(), 3);
        assert_eq!(store.dice.version(), version);
        assert!(store.error_message.as_deref().unwrap().contains("three"));

        update(&mut store, Action::ClearErrorMessage);
        assert!(store.error_message.is_none());
    }

    #[test]
    fn test_dice_input_is_clamped() {
        let mut store = store_with(presets::HILL, 3);
        update(
            &mut store,
            Action::SetDiceInput {
                text: "0".to_string(),
            },
        );
        assert_eq!(*store.dice.get(), 1);
        assert_eq!(store.dice_input, "1");

        update(&mut store, Action::StepDice { delta: -1 });
        assert_eq!(*store.dice.get(), 1);
        update(&mut store, Action::StepDice { delta: 1 });
        assert_eq!(*store.dice.get(), 2);
        assert_eq!(theory_outcomes(&store), dice::OutcomeRange::for_dice(2));
    }

    #[test]
    fn test_zero_roll_count_does_not_start() {
        let mut store = store_with(presets::FAIR, 1);
        run(
            &mut store,
            vec![
                Action::SetRollCountInput {
                    text: "0".to_string(),
                },
                Action::StartSimulation,
            ],
        );
        assert!(store.run.is_none());
        assert!(store.error_message.is_some());
    }

    #[test]
    fn test_full_run_through_ticks() {
        let mut store = store_with(presets::VALLEY, 4);
        run(
            &mut store,
            vec![
                Action::SetRollCountInput {
                    text: "1000".to_string(),
                },
                Action::StartSimulation,
            ],
        );
        assert!(store.views_match());
        roll_all(&mut store);

        let state = &store.run.as_ref().unwrap().state;
        assert_eq!(state.completed(), 1000);
        assert_eq!(state.counters().values().sum::<u64>(), 1000);
        assert!(state.rolls().iter().all(|r| (4..=24).contains(&r.sum)));

        let scene = &store.run.as_ref().unwrap().scene;
        assert_eq!(scene.count(Paint::CurrentRoll), 1);
        assert_eq!(scene.count(Paint::SettledRoll), 999);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut store = store_with(presets::FAIR, 2);
        run(&mut store, vec![Action::StartSimulation, Action::Tick]);
        update(&mut store, Action::TogglePause);
        run(&mut store, vec![Action::Tick, Action::Tick]);
        assert_eq!(store.run.as_ref().unwrap().state.completed(), 1);

        update(&mut store, Action::TogglePause);
        update(&mut store, Action::Tick);
        assert_eq!(store.run.as_ref().unwrap().state.completed(), 2);
    }

    #[test]
    fn test_click_selects_on_both_views() {
        let mut store = store_with(presets::HILL, 2);
        update(&mut store, Action::StartSimulation);
        for _ in 0..50 {
            update(&mut store, Action::Tick);
        }

        let bar = store
            .theory
            .as_ref()
            .unwrap()
            .bars
            .bar_for(7)
            .unwrap()
            .clone();
        update(
            &mut store,
            Action::GraphClicked {
                surface: Surface::Theory,
                at: bar.hitbox.center(),
            },
        );
        assert_eq!(store.selection.selected(), Some(7));
        assert_eq!(store.theory_scene.count(Paint::SelectedBar), 1);
        let scene = &store.run.as_ref().unwrap().scene;
        assert_eq!(scene.count(Paint::Boundary), 1);

        // Clicking the same bar again clears everything.
        update(
            &mut store,
            Action::GraphClicked {
                surface: Surface::Theory,
                at: bar.hitbox.center(),
            },
        );
        assert_eq!(store.selection.selected(), None);
        assert_eq!(store.theory_scene.count(Paint::SelectedBar), 0);
    }

    #[test]
    fn test_click_on_a_roll_selects_its_sum() {
        let mut store = store_with(presets::SLOPED, 2);
        update(&mut store, Action::StartSimulation);
        for _ in 0..30 {
            update(&mut store, Action::Tick);
        }
        let run_ref = store.run.as_ref().unwrap();
        let roll = run_ref.state.rolls()[0].clone();
        let at = roll.hitbox(run_ref.chart.box_size()).center();

        update(
            &mut store,
            Action::GraphClicked {
                surface: Surface::Simulation,
                at,
            },
        );
        assert_eq!(store.selection.selected(), Some(roll.sum));
    }

    #[test]
    fn test_edit_breaks_the_match_and_deselects() {
        let mut store = store_with(presets::HILL, 2);
        update(&mut store, Action::StartSimulation);
        for _ in 0..40 {
            update(&mut store, Action::Tick);
        }
        store.select_bin(7);
        assert!(store.selection.selected().is_some());

        update(
            &mut store,
            Action::SelectPreset {
                name: "Valley".to_string(),
            },
        );
        assert!(!store.views_match());
        assert_eq!(store.selection.selected(), None);
        let scene = &store.run.as_ref().unwrap().scene;
        assert_eq!(scene.count(Paint::Boundary), 0);
        assert_eq!(scene.count(Paint::HighlightedRoll), 0);

        // Without a match only the theoretical bar is marked.
        store.select_bin(7);
        assert_eq!(store.theory_scene.count(Paint::SelectedBar), 1);
        let scene = &store.run.as_ref().unwrap().scene;
        assert_eq!(scene.count(Paint::Boundary), 0);
    }

    #[test]
    fn test_presets_and_randomize() {
        let mut store = store_with(presets::FAIR, 1);
        update(
            &mut store,
            Action::SelectPreset {
                name: "Sloped".to_string(),
            },
        );
        assert_eq!(store.distribution(), presets::SLOPED);

        run(
            &mut store,
            vec![
                Action::Randomize,
                Action::AddPreset {
                    name: "Mine".to_string(),
                },
            ],
        );
        assert_eq!(store.presets.get("Mine"), Some(store.distribution()));

        update(
            &mut store,
            Action::SelectPreset {
                name: "Missing".to_string(),
            },
        );
        assert!(store.error_message.is_some());
    }

    #[test]
    fn test_file_actions_become_effects() {
        let mut store = store_with(presets::FAIR, 1);
        let effects = run(
            &mut store,
            vec![
                Action::SaveToFile {
                    path: PathBuf::from("a.json"),
                },
                Action::LoadFromFile {
                    path: PathBuf::from("b.json"),
                },
            ],
        );
        assert!(matches!(effects[0], Effect::SaveToFile { .. }));
        assert!(matches!(effects[1], Effect::LoadFromFile { .. }));
    }
}

use crate::actions::Action;
use crate::painter;
use crate::settings::FACE_RANGE;
use crate::state::State;
use crate::store::{ActiveTab, Surface};
use dice::Face;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::time::Duration;

const DICE_FIELD_WIDTH: f32 = 48.0;
const ROLL_FIELD_WIDTH: f32 = 72.0;
const LOG_ROW_HEIGHT: f32 = 18.0;

pub struct DiceApp {
    state: State,
    /// Text of the dice field while it is being edited.
    dice_text: String,
    preset_choice: String,
    new_preset_name: String,
    /// Time of the last roll, in seconds of `egui` input time.
    last_tick: Option<f64>,
}

impl DiceApp {
    pub fn new(state: State) -> Self {
        let dice_text = state.store.dice_input.clone();
        Self {
            state,
            dice_text,
            preset_choice: String::new(),
            new_preset_name: String::new(),
            last_tick: None,
        }
    }

    /// Queue as many rolls as the elapsed time allows and ask for the
    /// next frame.
    fn schedule_ticks(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let store = &self.state.store;
        let Some(run) = store.run.as_ref().filter(|_| store.is_running())
        else {
            self.last_tick = None;
            return;
        };

        let rate = store.settings.simulation.rolls_per_second.max(1.0);
        let now = ctx.input(|i| i.time);
        let last = *self.last_tick.get_or_insert(now);
        let remaining = run.state.roll_budget() - run.state.attempts();
        let due = (((now - last) * rate).floor() as u64).min(remaining);
        if due > 0 {
            self.last_tick = Some(last + due as f64 / rate);
            actions.extend((0..due).map(|_| Action::Tick));
        }
        ctx.request_repaint_after(Duration::from_secs_f64(1.0 / rate));
    }

    // ------------------------------------------------------------------
    // Left panel
    // ------------------------------------------------------------------

    fn distribution_controls(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.heading("Die");
        ui.separator();

        let model = self.state.store.model.get();
        let distribution = model.distribution();
        for face in Face::ALL {
            let locked = model.is_locked(face);
            let mut value = distribution.get(face);
            ui.horizontal(|ui| {
                let slider =
                    egui::Slider::new(&mut value, FACE_RANGE.min..=FACE_RANGE.max)
                        .step_by(f64::from(FACE_RANGE.step))
                        .text(format!("Face {}", face));
                if ui.add_enabled(!locked, slider).changed() {
                    actions.push(Action::MoveSlider { face, value });
                }
                let icon = if locked { "🔒" } else { "🔓" };
                if ui.selectable_label(locked, icon).clicked() {
                    actions.push(Action::ToggleLock { face });
                }
            });
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Preset")
                .selected_text(self.preset_choice.as_str())
                .show_ui(ui, |ui| {
                    for name in self.state.store.presets.names() {
                        let chosen = self.preset_choice == name;
                        if ui.selectable_label(chosen, name).clicked() {
                            self.preset_choice = name.to_string();
                            actions.push(Action::SelectPreset {
                                name: name.to_string(),
                            });
                        }
                    }
                });
            if ui.button("Randomize").clicked() {
                actions.push(Action::Randomize);
            }
        });
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.new_preset_name);
            if ui.button("Add preset").clicked() {
                actions.push(Action::AddPreset {
                    name: std::mem::take(&mut self.new_preset_name),
                });
            }
        });
    }

    fn dice_controls(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.add_space(8.0);
        ui.heading("Dice");
        ui.separator();

        let mut editing = false;
        ui.horizontal(|ui| {
            ui.label("Number of dice");
            if ui.small_button("-").clicked() {
                actions.push(Action::StepDice { delta: -1 });
            }
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.dice_text)
                    .desired_width(DICE_FIELD_WIDTH),
            );
            if response.lost_focus() {
                actions.push(Action::SetDiceInput {
                    text: self.dice_text.clone(),
                });
            }
            editing = response.has_focus();
            if ui.small_button("+").clicked() {
                actions.push(Action::StepDice { delta: 1 });
            }
        });
        if !editing {
            self.dice_text.clone_from(&self.state.store.dice_input);
        }
    }

    fn simulation_controls(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.add_space(8.0);
        ui.heading("Simulation");
        ui.separator();

        let store = &self.state.store;
        ui.horizontal(|ui| {
            ui.label("Rolls");
            let mut text = store.roll_count_input.clone();
            let field = egui::TextEdit::singleline(&mut text)
                .desired_width(ROLL_FIELD_WIDTH);
            if ui.add(field).changed() {
                actions.push(Action::SetRollCountInput { text });
            }
            if ui.button("Start").clicked() {
                actions.push(Action::StartSimulation);
            }
            let label = if store.paused { "Resume" } else { "Pause" };
            if ui.add_enabled(store.run.is_some(), egui::Button::new(label)).clicked() {
                actions.push(Action::TogglePause);
            }
        });
    }

    fn status(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.separator();

        let (die_mean, die_sd) = *self.state.cache.die_stats.get(&self.state.store);
        let (shifted_mean, _) =
            *self.state.cache.shifted_stats.get(&self.state.store);
        let store = &self.state.store;

        ui.label(format!("Die mean {:.3}, sd {:.3}", die_mean, die_sd));
        ui.label(format!("Shifted single-die mean {:.3}", shifted_mean));
        if let Some(theory) = &store.theory {
            ui.label(format!(
                "Sum of {} dice: mean {:.3}, sd {:.3}",
                theory.result.dice, theory.result.mean, theory.result.std_dev
            ));
        }

        if let Some(run) = &store.run {
            ui.label(format!(
                "Rolls {} / {}",
                run.state.completed(),
                run.state.roll_budget()
            ));
            if run.state.anomalies() > 0 {
                ui.label(format!("Skipped rolls {}", run.state.anomalies()));
            }
            if !store.views_match() {
                ui.weak("The simulation was run with other settings.");
            }
        }
        if let Some(outcome) = store.selection.selected() {
            let count = store.run.as_ref().map_or(0, |run| run.state.count(outcome));
            ui.label(format!(
                "Sum {}: {} rolls, {} since selected",
                outcome, count, store.selected_hits
            ));
        }
    }

    // ------------------------------------------------------------------
    // Central panel
    // ------------------------------------------------------------------

    fn charts(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let store = &self.state.store;
        let settings = &store.settings;

        ui.heading("Theoretical distribution");
        if let Some(at) = painter::show_chart(
            ui,
            &store.theory_scene,
            settings.theory_area(),
            settings.theory.margins,
        ) {
            actions.push(Action::GraphClicked {
                surface: Surface::Theory,
                at,
            });
        }

        ui.separator();
        ui.heading("Simulation");
        egui::ScrollArea::both().show(ui, |ui| match &store.run {
            Some(run) => {
                if let Some(at) = painter::show_chart(
                    ui,
                    &run.scene,
                    run.chart.area(),
                    settings.simulation.margins,
                ) {
                    actions.push(Action::GraphClicked {
                        surface: Surface::Simulation,
                        at,
                    });
                }
            }
            None => {
                ui.label("Press Start to roll the dice.");
            }
        });
    }

    fn roll_log(&self, ui: &mut egui::Ui) {
        let Some(run) = &self.state.store.run else {
            ui.label("No rolls yet.");
            return;
        };
        let rolls = run.state.rolls();

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Roll");
                });
                header.col(|ui| {
                    ui.strong("Faces");
                });
                header.col(|ui| {
                    ui.strong("Sum");
                });
            })
            .body(|body| {
                body.rows(LOG_ROW_HEIGHT, rolls.len(), |mut row| {
                    let roll = &rolls[row.index()];
                    row.col(|ui| {
                        ui.label(roll.roll_number.to_string());
                    });
                    row.col(|ui| {
                        let faces: Vec<String> =
                            roll.faces.iter().map(u8::to_string).collect();
                        ui.label(faces.join(" "));
                    });
                    row.col(|ui| {
                        ui.label(roll.sum.to_string());
                    });
                });
            });
    }
}

impl eframe::App for DiceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        // Menu bar at the very top
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                #[cfg(not(target_arch = "wasm32"))]
                ui.menu_button("File", |ui| {
                    if ui.button("Save").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .save_file()
                        {
                            actions.push(Action::SaveToFile { path });
                        }
                    }

                    if ui.button("Load").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                        {
                            actions.push(Action::LoadFromFile { path });
                        }
                    }
                });
            });
        });

        // Tab navigation below menu bar
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut tab = self.state.store.active_tab;
                ui.selectable_value(&mut tab, ActiveTab::Charts, "Charts");
                ui.selectable_value(&mut tab, ActiveTab::RollLog, "Roll Log");
                if tab != self.state.store.active_tab {
                    actions.push(Action::SetActiveTab { tab });
                }
            });
        });

        egui::SidePanel::left("controls")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.distribution_controls(ui, &mut actions);
                    self.dice_controls(ui, &mut actions);
                    self.simulation_controls(ui, &mut actions);
                    self.status(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.state.store.active_tab {
                ActiveTab::Charts => self.charts(ui, &mut actions),
                ActiveTab::RollLog => self.roll_log(ui),
            }
        });

        // Display error dialog if there's an error message
        if let Some(error) = self.state.store.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        actions.push(Action::ClearErrorMessage);
                    }
                });
        }

        self.schedule_ticks(ctx, &mut actions);

        for action in actions {
            self.state.dispatch(action);
        }
        self.state.flush_actions();
        self.state.flush_effects();
    }
}

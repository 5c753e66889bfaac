use tracing::debug;

use crate::canvas::{Canvas, FigureId, Paint};
use crate::chart::{BarChart, RollChart};
use crate::convolution::ConvolutionResult;
use crate::distribution::Distribution;
use crate::simulation::{RollStyle, SimulationState};

/// The two views are comparable only while the simulation snapshot
/// is what the editor currently shows.
pub fn views_match(
    simulation: &SimulationState,
    distribution: &Distribution,
    dice: u32,
    convolution: &ConvolutionResult,
) -> bool {
    simulation.distribution() == *distribution
        && simulation.dice() == dice
        && convolution.dice == dice
        && simulation.theory().possible_outcomes()
            == convolution.possible_outcomes()
}

/// Simulation side of a selection change.
pub struct SimulationView<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub chart: &'a RollChart,
    pub state: &'a SimulationState,
    /// Result of [`views_match`] for the live editor.
    pub matches: bool,
}

/// At most one selected outcome, shown on both views.
#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    selected: Option<u32>,
    marked_bar: Option<FigureId>,
    boundary: Option<FigureId>,
    highlighted: Vec<usize>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Roll indices currently drawn as highlighted.
    pub fn highlighted(&self) -> &[usize] {
        &self.highlighted
    }

    pub fn select_bin(
        &mut self,
        outcome: u32,
        theory_canvas: &mut dyn Canvas,
        bars: &BarChart,
        mut simulation: Option<&mut SimulationView<'_>>,
    ) {
        self.deselect_all(theory_canvas, simulation.as_deref_mut());
        self.selected = Some(outcome);

        if let Some(id) = bars.figure_for(outcome) {
            theory_canvas.restyle(id, Paint::SelectedBar);
            self.marked_bar = Some(id);
        }

        let Some(view) = simulation else {
            return;
        };
        if !view.matches {
            debug!(outcome, "selected on the theoretical view only");
            return;
        }

        let current = view.state.current_index();
        for &index in view.state.bucket(outcome) {
            if Some(index) == current {
                continue;
            }
            view.chart
                .restyle_roll(view.canvas, index, RollStyle::Highlighted);
            self.highlighted.push(index);
        }
        if let Some(rect) = view.chart.column_rect(outcome) {
            let id = view.canvas.draw_rect(
                rect.top_left(),
                rect.bottom_right(),
                Paint::Boundary,
            );
            self.boundary = Some(id);
        }
        debug!(
            outcome,
            highlighted = self.highlighted.len(),
            "selected on both views"
        );
    }

    pub fn deselect_all(
        &mut self,
        theory_canvas: &mut dyn Canvas,
        simulation: Option<&mut SimulationView<'_>>,
    ) {
        if let Some(id) = self.marked_bar.take() {
            theory_canvas.restyle(id, Paint::Bar);
        }

        let highlighted = std::mem::take(&mut self.highlighted);
        let boundary = self.boundary.take();
        if let Some(view) = simulation {
            for index in highlighted {
                view.chart
                    .restyle_roll(view.canvas, index, RollStyle::Settled);
            }
            if let Some(id) = boundary {
                view.canvas.delete(id);
            }
        }
        self.selected = None;
    }

    /// Forget every figure id without touching a canvas, for when both
    /// views have been erased and redrawn.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Settle the roll before the newest one. Returns whether the
    /// newest roll landed in the selected bin.
    pub fn roll_added(&mut self, view: &mut SimulationView<'_>) -> bool {
        let Some(current) = view.state.current_index() else {
            return false;
        };

        if let Some(previous) = current.checked_sub(1) {
            let in_selection = view.matches
                && view
                    .state
                    .roll(previous)
                    .is_some_and(|roll| Some(roll.sum) == self.selected);
            let style = if in_selection {
                RollStyle::Highlighted
            } else {
                RollStyle::Settled
            };
            view.chart.restyle_roll(view.canvas, previous, style);
            if in_selection && !self.highlighted.contains(&previous) {
                self.highlighted.push(previous);
            }
        }

        view.state
            .roll(current)
            .is_some_and(|roll| Some(roll.sum) == self.selected)
    }
}

//! Layout of the two views on a [`Canvas`]: theoretical bars and
//! stacked roll boxes. Both keep the ids of what they drew so the
//! selection can restyle figures later without redrawing.

use crate::canvas::{Anchor, Area, Canvas, FigureId, Paint, Point, Rect};
use crate::convolution::{ChartScale, ConvolutionEngine, ConvolutionResult};
use crate::outcomes::OutcomeRange;
use crate::simulation::{BoxSize, RollStyle, SimulationState};

/// Extra distance around a bar that still counts as a click on it.
pub const HIT_SLACK: f64 = 2.0;

const TICK_LENGTH: f64 = 5.0;
const X_LABEL_OFFSET: f64 = 14.0;
const Y_LABEL_OFFSET: f64 = 8.0;

//##########################################################
// Theoretical bars
//##########################################################

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub outcome: u32,
    pub probability: f64,
    pub hitbox: Rect,
}

#[derive(Debug, Clone)]
pub struct BarChart {
    area: Area,
    scale: ChartScale,
    result: ConvolutionResult,
    bars: Vec<Bar>,
    figures: Vec<FigureId>,
}

impl BarChart {
    /// Scale the pmf so its tallest bar reaches `headroom` of the
    /// area, trim the negligible tails, and place one bar per bin.
    pub fn layout(
        full: &ConvolutionResult,
        area: Area,
        engine: &ConvolutionEngine,
        headroom: f64,
    ) -> Self {
        let scale = ChartScale::derive(&full.pmf, area, headroom);
        let result = engine.trim(full, scale.scalar);
        // Trimming keeps the peak, so only the bin width moves.
        let scale = ChartScale::derive(&result.pmf, area, headroom);

        let bars = result
            .pmf
            .enumerate()
            .enumerate()
            .map(|(i, (outcome, probability))| {
                let left = i as f64 * scale.bin_width;
                Bar {
                    outcome,
                    probability,
                    hitbox: Rect {
                        left,
                        bottom: 0.0,
                        right: left + scale.bin_width,
                        top: probability * scale.scalar,
                    },
                }
            })
            .collect();

        Self {
            area,
            scale,
            result,
            bars,
            figures: Vec::new(),
        }
    }

    /// Draw the frame, every bar and the outcome axis.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        draw_frame(canvas, self.area);
        self.figures = self
            .bars
            .iter()
            .map(|bar| {
                canvas.draw_rect(
                    bar.hitbox.top_left(),
                    bar.hitbox.bottom_right(),
                    Paint::Bar,
                )
            })
            .collect();
        draw_outcome_axis(
            canvas,
            self.result.possible_outcomes(),
            self.scale.bin_width,
        );
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn scale(&self) -> ChartScale {
        self.scale
    }

    /// The displayed, possibly trimmed, result.
    pub fn result(&self) -> &ConvolutionResult {
        &self.result
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar_for(&self, outcome: u32) -> Option<&Bar> {
        self.result
            .possible_outcomes()
            .index_of(outcome)
            .and_then(|i| self.bars.get(i))
    }

    /// Figure of the bar for `outcome`, once drawn.
    pub fn figure_for(&self, outcome: u32) -> Option<FigureId> {
        self.result
            .possible_outcomes()
            .index_of(outcome)
            .and_then(|i| self.figures.get(i))
            .copied()
    }

    /// Outcome of the bar under `point`, if any.
    pub fn bar_at(&self, point: Point) -> Option<u32> {
        self.bars
            .iter()
            .find(|bar| bar.hitbox.contains(point, HIT_SLACK))
            .map(|bar| bar.outcome)
    }
}

//##########################################################
// Roll boxes
//##########################################################

#[derive(Debug, Clone)]
pub struct RollChart {
    area: Area,
    box_size: BoxSize,
    outcomes: OutcomeRange,
    roll_budget: u64,
    figures: Vec<Option<FigureId>>,
}

impl RollChart {
    pub fn new(state: &SimulationState, area: Area) -> Self {
        Self {
            area,
            box_size: state.box_size(),
            outcomes: state.outcomes(),
            roll_budget: state.roll_budget(),
            figures: Vec::new(),
        }
    }

    /// Frame, roll-count grid on the y axis and outcome labels on the
    /// x axis.
    pub fn draw_axes(&self, canvas: &mut dyn Canvas) {
        draw_frame(canvas, self.area);

        let spacing = y_tick_spacing(self.roll_budget);
        let step = spacing as f64 * self.box_size.height;
        if step > 0.0 {
            let mut count = spacing;
            let mut y = step;
            while y <= self.area.height {
                canvas.draw_line(
                    Point::new(0.0, y),
                    Point::new(self.area.width, y),
                    Paint::GridLine,
                );
                canvas.draw_line(
                    Point::new(-TICK_LENGTH, y),
                    Point::new(0.0, y),
                    Paint::Tick,
                );
                canvas.draw_text(
                    &count.to_string(),
                    Point::new(-Y_LABEL_OFFSET, y),
                    Anchor::Right,
                );
                count += spacing;
                y += step;
            }
        }

        draw_outcome_axis(canvas, self.outcomes, self.box_size.width);
    }

    /// Draw the box of roll `index` as the current roll.
    pub fn draw_roll(
        &mut self,
        canvas: &mut dyn Canvas,
        state: &SimulationState,
        index: usize,
    ) -> Option<FigureId> {
        let hitbox = state.roll(index)?.hitbox(self.box_size);
        let id = canvas.draw_rect(
            hitbox.top_left(),
            hitbox.bottom_right(),
            RollStyle::Current.paint(),
        );
        if self.figures.len() <= index {
            self.figures.resize(index + 1, None);
        }
        self.figures[index] = Some(id);
        Some(id)
    }

    pub fn roll_figure(&self, index: usize) -> Option<FigureId> {
        self.figures.get(index).copied().flatten()
    }

    pub fn restyle_roll(
        &self,
        canvas: &mut dyn Canvas,
        index: usize,
        style: RollStyle,
    ) {
        if let Some(id) = self.roll_figure(index) {
            canvas.restyle(id, style.paint());
        }
    }

    /// Index of the roll whose box is under `point`.
    pub fn roll_at(
        &self,
        state: &SimulationState,
        point: Point,
    ) -> Option<usize> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (point.x / self.box_size.width).floor() as usize;
        let row = (point.y / self.box_size.height).floor() as usize;
        let outcome = self.outcomes.value_of(column)?;
        let index = *state.bucket(outcome).get(row)?;
        let roll = state.roll(index)?;
        roll.hitbox(self.box_size)
            .contains(point, 0.0)
            .then_some(index)
    }

    /// Full-height column of `outcome`.
    pub fn column_rect(&self, outcome: u32) -> Option<Rect> {
        let column = self.outcomes.index_of(outcome)?;
        let left = column as f64 * self.box_size.width;
        Some(Rect {
            left,
            bottom: 0.0,
            right: left + self.box_size.width,
            top: self.area.height,
        })
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }
}

/// Roll-count interval between y ticks: a fifteenth of the budget,
/// rounded to a multiple of 5, never below 5.
pub fn y_tick_spacing(roll_budget: u64) -> u64 {
    if roll_budget <= 44 {
        return 5;
    }
    let raw = roll_budget / 15;
    let rounded = (raw + 2) / 5 * 5;
    rounded.max(5)
}

// ----------------------------------------------------------
// Shared drawing
// ----------------------------------------------------------

fn draw_frame(canvas: &mut dyn Canvas, area: Area) -> FigureId {
    canvas.draw_rect(
        Point::new(0.0, area.height),
        Point::new(area.width, 0.0),
        Paint::Frame,
    )
}

/// A tick and label under every sixth of the outcomes.
fn draw_outcome_axis(
    canvas: &mut dyn Canvas,
    outcomes: OutcomeRange,
    bin_width: f64,
) {
    let every = (outcomes.len() / 6).max(1);
    for (i, outcome) in outcomes.iter().enumerate().step_by(every) {
        let x = (i as f64 + 0.5) * bin_width;
        canvas.draw_line(
            Point::new(x, 0.0),
            Point::new(x, -TICK_LENGTH),
            Paint::Tick,
        );
        canvas.draw_text(
            &outcome.to_string(),
            Point::new(x, -X_LABEL_OFFSET),
            Anchor::Center,
        );
    }
}

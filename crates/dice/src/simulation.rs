use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::canvas::{Area, Paint, Rect};
use crate::convolution::{self, ConvolutionResult};
use crate::distribution::Distribution;
use crate::error::{DiceError, DiceResult};
use crate::outcomes::OutcomeRange;

//##########################################################
// Partition
//##########################################################

/// Inverse-CDF table of a single die: `bounds[0] = 0`,
/// `bounds[i] = bounds[i - 1] + p_i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition([f64; 7]);

impl Partition {
    pub fn new(distribution: &Distribution) -> Self {
        let unit = distribution.unit();
        let mut bounds = [0.0; 7];
        for (i, p) in unit.iter().enumerate() {
            bounds[i + 1] = bounds[i] + p;
        }
        // Rounding must not leave a gap just below 1.
        bounds[6] = 1.0;
        Self(bounds)
    }

    pub fn bounds(&self) -> &[f64; 7] {
        &self.0
    }

    /// Face `j + 1` for the unique `j` with
    /// `bounds[j] <= u < bounds[j + 1]`, `None` if no slot covers `u`.
    pub fn sample_face(&self, u: f64) -> Option<u8> {
        self.0
            .windows(2)
            .position(|w| w[0] <= u && u < w[1])
            .map(|j| j as u8 + 1)
    }
}

//##########################################################
// Rolls
//##########################################################

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// One recorded roll of all the dice.
#[derive(Debug, Clone, PartialEq)]
pub struct Roll {
    /// 1-based, in recording order.
    pub roll_number: u64,
    pub faces: Vec<u8>,
    pub sum: u32,
    /// How many rolls (this one included) have landed on `sum`.
    pub occurrence_index: u64,
    pub column: usize,
    pub row: usize,
}

impl Roll {
    /// Box of this roll in chart coordinates: stacked upward from the
    /// bottom of its outcome column.
    pub fn hitbox(&self, size: BoxSize) -> Rect {
        let left = self.column as f64 * size.width;
        let bottom = self.row as f64 * size.height;
        Rect {
            left,
            bottom,
            right: left + size.width,
            top: bottom + size.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollStyle {
    /// The latest roll.
    Current,
    Settled,
    /// In the selected bin while the two views match.
    Highlighted,
}

impl RollStyle {
    pub fn paint(self) -> Paint {
        match self {
            RollStyle::Current => Paint::CurrentRoll,
            RollStyle::Settled => Paint::SettledRoll,
            RollStyle::Highlighted => Paint::HighlightedRoll,
        }
    }
}

//##########################################################
// Engine
//##########################################################

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationEngine {
    /// Plot area of the simulation view.
    pub area: Area,
    pub box_height_min: f64,
    /// Upper bound of a box height, as a share of `area.height`.
    pub box_height_max_fraction: f64,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self {
            area: Area::new(821.0, 630.0),
            box_height_min: 2.0,
            box_height_max_fraction: 0.08,
        }
    }
}

impl SimulationEngine {
    /// Validate the request, convolve, and set up a fresh run.
    pub fn start(
        &self,
        distribution: &Distribution,
        dice: u32,
        roll_budget: u64,
    ) -> DiceResult<SimulationState> {
        check_budget(roll_budget)?;
        let theory = convolution::convolve(distribution, dice)?;
        self.start_from(theory, roll_budget)
    }

    /// Same as `start`, reusing an existing convolution as the
    /// theoretical snapshot.
    pub fn start_from(
        &self,
        theory: ConvolutionResult,
        roll_budget: u64,
    ) -> DiceResult<SimulationState> {
        check_budget(roll_budget)?;
        if theory.dice < 1 {
            return Err(DiceError::InvalidDiceCount(format!(
                "{}, at least one die is needed",
                theory.dice
            )));
        }

        let outcomes = OutcomeRange::for_dice(theory.dice);
        let box_size = self.box_size(&theory, outcomes, roll_budget);
        let counters = outcomes.iter().map(|x| (x, 0)).collect();
        info!(
            dice = theory.dice,
            roll_budget,
            box_width = box_size.width,
            box_height = box_size.height,
            "simulation started"
        );

        Ok(SimulationState {
            distribution: theory.distribution,
            dice: theory.dice,
            roll_budget,
            partition: Partition::new(&theory.distribution),
            theory,
            outcomes,
            counters,
            rolls: Vec::new(),
            buckets: BTreeMap::new(),
            box_size,
            attempts: 0,
            anomalies: 0,
        })
    }

    /// Fixed for the whole run, estimated from the theoretical pmf
    /// since nothing has been rolled yet.
    pub fn box_size(
        &self,
        theory: &ConvolutionResult,
        outcomes: OutcomeRange,
        roll_budget: u64,
    ) -> BoxSize {
        let approx_tallest =
            (roll_budget as f64 * theory.max_probability()).floor().max(1.0);
        let max_height = (self.box_height_max_fraction * self.area.height)
            .max(self.box_height_min);
        let height = (self.area.height / approx_tallest)
            .clamp(self.box_height_min, max_height);
        let width = self.area.width / outcomes.len().max(1) as f64;
        BoxSize { width, height }
    }
}

fn check_budget(roll_budget: u64) -> DiceResult<()> {
    if roll_budget < 1 {
        return Err(DiceError::InvalidRollCount(format!(
            "{roll_budget}, at least one roll is needed"
        )));
    }
    Ok(())
}

//##########################################################
// State
//##########################################################

/// A run in progress. Owns its counters and roll list; the
/// distribution and convolution are snapshots taken at start.
#[derive(Debug, Clone)]
pub struct SimulationState {
    distribution: Distribution,
    dice: u32,
    roll_budget: u64,
    theory: ConvolutionResult,
    partition: Partition,
    outcomes: OutcomeRange,
    counters: BTreeMap<u32, u64>,
    rolls: Vec<Roll>,
    buckets: BTreeMap<u32, Vec<usize>>,
    box_size: BoxSize,
    attempts: u64,
    anomalies: u64,
}

impl SimulationState {
    /// Make one attempt at rolling all the dice. Each call consumes
    /// one unit of the budget, whether or not a roll is recorded.
    pub fn roll_dice<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> DiceResult<&Roll> {
        if self.is_finished() {
            return Err(DiceError::RollBudgetExhausted(self.roll_budget));
        }
        self.attempts += 1;
        let roll_number = self.rolls.len() as u64 + 1;

        let mut faces = Vec::with_capacity(self.dice as usize);
        let mut covered = true;
        for _ in 0..self.dice {
            match self.partition.sample_face(rng.random::<f64>()) {
                Some(face) => faces.push(face),
                None => covered = false,
            }
        }
        let sum: u32 = faces.iter().map(|&f| u32::from(f)).sum();

        let counter = match self.counters.get_mut(&sum) {
            Some(counter) if covered => counter,
            _ => {
                self.anomalies += 1;
                warn!(roll_number, sum, "roll outside the possible outcomes, skipped");
                return Err(DiceError::OutcomeOutOfRange { roll_number, sum });
            }
        };
        *counter += 1;
        let occurrence_index = *counter;

        let column = (sum - self.outcomes.first()) as usize;
        let index = self.rolls.len();
        self.rolls.push(Roll {
            roll_number,
            faces,
            sum,
            occurrence_index,
            column,
            row: (occurrence_index - 1) as usize,
        });
        self.buckets.entry(sum).or_default().push(index);

        if self.is_finished() {
            debug!(
                rolls = self.rolls.len(),
                anomalies = self.anomalies,
                "simulation finished"
            );
        }
        Ok(&self.rolls[index])
    }

    pub fn is_finished(&self) -> bool {
        self.attempts >= self.roll_budget
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn dice(&self) -> u32 {
        self.dice
    }

    pub fn roll_budget(&self) -> u64 {
        self.roll_budget
    }

    pub fn theory(&self) -> &ConvolutionResult {
        &self.theory
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Every outcome that has a counter, `[dice, 6 · dice]`.
    pub fn outcomes(&self) -> OutcomeRange {
        self.outcomes
    }

    pub fn counters(&self) -> &BTreeMap<u32, u64> {
        &self.counters
    }

    pub fn count(&self, outcome: u32) -> u64 {
        self.counters.get(&outcome).copied().unwrap_or(0)
    }

    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    pub fn roll(&self, index: usize) -> Option<&Roll> {
        self.rolls.get(index)
    }

    /// Index of the latest roll.
    pub fn current_index(&self) -> Option<usize> {
        self.rolls.len().checked_sub(1)
    }

    pub fn current(&self) -> Option<&Roll> {
        self.rolls.last()
    }

    /// Indices into `rolls()` of the rolls that summed to `outcome`,
    /// in recording order.
    pub fn bucket(&self, outcome: u32) -> &[usize] {
        self.buckets.get(&outcome).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn completed(&self) -> usize {
        self.rolls.len()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }
}

use tracing::debug;

use crate::canvas::Area;
use crate::distribution::Distribution;
use crate::error::{DiceError, DiceResult};
use crate::outcomes::OutcomeRange;
use crate::pmf::Pmf;

/// Exact distribution of the sum of `dice` independent dice.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionResult {
    /// Single-die distribution this was computed from.
    pub distribution: Distribution,
    pub dice: u32,
    pub pmf: Pmf,
    /// Moments of the full, untrimmed sum distribution.
    pub mean: f64,
    pub std_dev: f64,
}

impl ConvolutionResult {
    pub fn possible_outcomes(&self) -> OutcomeRange {
        self.pmf.outcomes()
    }

    pub fn max_probability(&self) -> f64 {
        self.pmf.max()
    }

    /// Whether tail bins have been dropped for display.
    pub fn is_trimmed(&self) -> bool {
        self.pmf.outcomes() != OutcomeRange::for_dice(self.dice)
    }
}

/// Convolve the single-die pmf with itself `dice − 1` times.
pub fn convolve(
    distribution: &Distribution,
    dice: u32,
) -> DiceResult<ConvolutionResult> {
    if dice < 1 {
        return Err(DiceError::InvalidDiceCount(format!(
            "{dice}, at least one die is needed"
        )));
    }

    let single = distribution.to_pmf()?;
    let mut pmf = single.clone();
    for _ in 1..dice {
        pmf = pmf.convolve(&single);
    }

    let mean = pmf.mean();
    let std_dev = pmf.std_dev();
    debug!(dice, mean, std_dev, bins = pmf.len(), "convolved");

    Ok(ConvolutionResult {
        distribution: *distribution,
        dice,
        pmf,
        mean,
        std_dev,
    })
}

/// Pixel scale of a bar chart: probability → height, bin → width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScale {
    pub scalar: f64,
    pub bin_width: f64,
}

impl ChartScale {
    /// The tallest bar reaches `headroom · area.height`.
    pub fn derive(pmf: &Pmf, area: Area, headroom: f64) -> Self {
        let highest = pmf.max();
        let scalar = if highest > 0.0 {
            headroom * area.height / highest
        } else {
            1.0
        };
        let bin_width = area.width / pmf.len().max(1) as f64;
        Self { scalar, bin_width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolutionEngine {
    /// Bars whose scaled height is at most this are negligible.
    pub trim_tolerance: f64,
    /// Fewer dice than this are never trimmed.
    pub trim_min_dice: u32,
}

impl Default for ConvolutionEngine {
    fn default() -> Self {
        Self {
            trim_tolerance: 1.0,
            trim_min_dice: 5,
        }
    }
}

impl ConvolutionEngine {
    pub fn new(trim_tolerance: f64, trim_min_dice: u32) -> Self {
        Self {
            trim_tolerance,
            trim_min_dice,
        }
    }

    pub fn convolve(
        &self,
        distribution: &Distribution,
        dice: u32,
    ) -> DiceResult<ConvolutionResult> {
        convolve(distribution, dice)
    }

    /// Drop the tails whose bars would be at most `trim_tolerance`
    /// tall once multiplied by `scalar`. The window always contains
    /// the tallest bar.
    pub fn trim(
        &self,
        result: &ConvolutionResult,
        scalar: f64,
    ) -> ConvolutionResult {
        if result.dice < self.trim_min_dice || result.pmf.is_empty() {
            return result.clone();
        }

        let visible = |p: f64| p * scalar > self.trim_tolerance;
        let values = &result.pmf.values;
        let peak = result.pmf.argmax().unwrap_or(0);
        let left = values
            .iter()
            .position(|&p| visible(p))
            .unwrap_or(peak)
            .min(peak);
        let right = values
            .iter()
            .rposition(|&p| visible(p))
            .unwrap_or(peak)
            .max(peak);

        let pmf = result.pmf.window(left, right);
        debug!(
            dice = result.dice,
            from = pmf.outcomes().first(),
            to = pmf.outcomes().last(),
            dropped = result.pmf.len() - pmf.len(),
            "trimmed convolution"
        );

        ConvolutionResult {
            pmf,
            ..result.clone()
        }
    }
}

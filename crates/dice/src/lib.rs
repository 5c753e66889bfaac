pub mod canvas;
pub mod chart;
pub mod convolution;
pub mod distribution;
pub mod error;
pub mod outcomes;
pub mod pmf;
pub mod presets;
pub mod selection;
pub mod simulation;

pub use canvas::{Anchor, Area, Canvas, FigureId, Paint, Point, Rect, Scene};
pub use chart::{BarChart, RollChart};
pub use convolution::{ChartScale, ConvolutionEngine, ConvolutionResult};
pub use distribution::{
    mean_and_deviation, Distribution, DistributionModel, Face, LockSet,
};
pub use error::{BuildError, DiceError, DiceResult};
pub use outcomes::OutcomeRange;
pub use pmf::Pmf;
pub use presets::Presets;
pub use selection::{views_match, SelectionCoordinator, SimulationView};
pub use simulation::{
    BoxSize, Partition, Roll, RollStyle, SimulationEngine, SimulationState,
};

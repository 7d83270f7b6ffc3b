pub mod engine;
pub mod resample;
pub mod summary;

pub use engine::{simulate, simulate_with, AccumulationEngine};
pub use resample::{period_end, resample, resample_and_window, window};
pub use summary::{
    summarize, unit_equivalence, Comparator, Comparison, Equivalent, InstrumentReport,
    InstrumentRun, UnitEquivalence, DEFAULT_SUBUNIT_SCALE,
};

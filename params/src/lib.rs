//! Parameter records and sweep expansion for the simrun client (components
//! C1 and C2 of the system overview).
//!

mod pop;
mod run_params;
mod sweep;
mod value;

pub use pop::PopRef;
pub use run_params::{materialize_seed, random_seed, RunParams};
pub use sweep::{absent_axis, Axis, ConfigSweep, DateInput, SeedSpec, SweepExpander};
pub use value::{ModelParams, ParamValue, SimDate};

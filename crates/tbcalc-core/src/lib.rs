//! Load-scheme and plate-breakdown engine for Tactical Barbell programming
//! sheets.
//!
//! The crate turns one-rep maxes, a week percentage table and a plate
//! inventory into a [`ProgramDocument`]: ordered weeks, ordered lifts, and
//! for each lift a ramp of loadable sets with per-side plate strings.
//! Everything here is pure computation; file discovery, PDF output and the
//! command line live in `tbcalc-cli`.

pub mod breakdown;
pub mod config;
pub mod count;
pub mod format;
pub mod lift;
pub mod onerm;
pub mod plates;
pub mod program;
pub mod render;
pub mod rounding;
pub mod scheme;
pub mod warmup;
pub mod week;

pub use breakdown::{PlateLoad, format_breakdown, plate_breakdown};
pub use config::{ConfigError, ConfigLayer, OutputSettings, ProgramConfig};
pub use count::Count;
pub use format::{WeightFormat, WeightUnit, format_number};
pub use lift::{Lift, LiftInput, LiftInputError};
pub use onerm::{AddedPerformance, OneRepMaxParseError, Performance, estimate_one_rep_max};
pub use plates::{Implement, PlateCount, PlateError, PlateInventory};
pub use program::{ProgramBuilder, ProgramDocument, ProgramError, ProgramLift, ProgramWeek};
pub use render::{MarkdownRenderer, PlainRenderer, Renderer, render_document};
pub use rounding::nearest_loadable;
pub use scheme::{
    LiftRamp, RampError, RampPolicy, RampStep, SchemeGenerator, SetPrescription, TopSet,
    UnloadablePolicy,
};
pub use warmup::{WarmupError, WarmupPolicy};
pub use week::{WeekSelection, WeekTable};

pub mod constants;
pub mod coordinates;
pub mod progress;

pub use constants::*;
pub use coordinates::{decimal_to_dms, dms_to_decimal};
pub use progress::ProgressReporter;

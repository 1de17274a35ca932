pub mod coordinate;
pub mod format;
pub mod request;

pub use coordinate::Coordinate;
pub use format::{Axis, Format, Hemisphere, Side};
pub use request::ConversionRequest;

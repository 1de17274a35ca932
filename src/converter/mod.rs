pub mod dispatcher;
pub mod hub;

pub use dispatcher::{Converter, Route};
pub use hub::HubConverter;

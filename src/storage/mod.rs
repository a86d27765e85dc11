mod snapshot;
mod store;

pub use snapshot::*;
pub use store::*;

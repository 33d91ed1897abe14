pub mod detect;
pub mod picks;
pub mod score;
pub mod snapshot;

pub use detect::*;
pub use picks::*;
pub use score::*;
pub use snapshot::*;

//! Truncation decision pipeline, leaves first:
//! activity overlay → input assembly → decision → admission → executor.
mod activity;
mod admission;
mod decision;
mod input;
mod truncator;

pub use activity::*;
pub use admission::*;
pub use decision::*;
pub use input::*;
pub use truncator::*;

//! External collaborators: the source page, its rate table, and the clock.

pub mod clock;
pub mod source;
pub mod table;

pub use clock::*;
pub use source::*;
pub use table::*;

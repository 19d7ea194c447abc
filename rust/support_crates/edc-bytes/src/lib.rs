//! Native byte buffers for the container codec: a single-owner allocation,
//! forward-only read/write cursors over raw memory and an amortized-growth
//! append buffer for streamed input.

pub mod cursor;
pub mod growable;
pub mod owning;

pub use cursor::{ArrayView, FixedLayout, StreamReader, StreamWriter};
pub use growable::GrowableBuffer;
pub use owning::OwningBuffer;

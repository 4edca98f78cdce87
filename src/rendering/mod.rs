pub mod frame;
pub mod sequence;

// Re-export main types
pub use frame::{border_intersection, Border, BorderPosition, Frame};
pub use sequence::FrameSequence;

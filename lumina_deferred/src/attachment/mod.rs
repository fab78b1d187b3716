/// Attachment module - intermediate images and their lifetime contract

pub mod attachment;
pub mod attachment_set;
pub mod frame_ring;

pub use attachment::*;
pub use attachment_set::*;
pub use frame_ring::*;

//! Data models for the uploading plugin
//!
//! Product media assets, the host-owned product rows they attach to, signed
//! upload grants and the thumbnail tasks handed to the host's worker.

mod media;
mod product;
mod task;
mod upload;

pub use media::*;
pub use product::*;
pub use task::*;
pub use upload::*;

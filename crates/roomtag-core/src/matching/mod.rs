//! Cross-document identity resolution
//!
//! Host and linked documents share no ids. Everything here pairs them by
//! name: the link by display name, levels and phases by exact name.
//!
//! - [`select_link`]: pick the one link a run works through
//! - [`matching_levels`]: level names present in both documents
//! - [`ViewIndex`]: host plan views bucketed by `(level, phase)`
//! - [`RoomFilter`]: linked rooms eligible for a given view

mod levels;
mod links;
mod rooms;
mod views;

pub use levels::matching_levels;
pub use links::select_link;
pub use rooms::{candidates, RoomFilter};
pub use views::{ViewIndex, ViewKey};

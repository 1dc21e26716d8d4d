//! Broadcast groups: labels, member sets, and the reverse membership index.

pub mod group;
pub mod label;
pub mod subscription;

pub use group::Group;
pub use label::{GroupKind, GroupLabel, room_key};
pub use subscription::MembershipTracker;

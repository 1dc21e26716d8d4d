//! Wire envelopes and the JSON codec used on both socket kinds.

pub mod codec;
pub mod types;

pub use codec::{decode_chat, encode_frame};
pub use types::{GroupEvent, InboundChat, OutboundFrame};

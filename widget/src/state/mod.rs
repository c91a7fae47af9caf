//! Per-instance widget state, kept free of transport and surface concerns.
//!
//! DESIGN
//! ======
//! The transitions here are synchronous and pure so the state machine
//! (`Idle -> AwaitingResponse -> Idle`) can be tested without any I/O. The
//! controllers in `chat` and `search` wrap these with the network call and
//! the surface updates.

pub mod conversation;
pub mod overlay;
pub mod widget;

pub use conversation::{Conversation, Message, generate_token};
pub use overlay::{DocType, OverlayState, SearchFilters, SearchIgnored};
pub use widget::{Ignored, PendingSend, Phase, Settled, Settlement, Visibility, WidgetState};

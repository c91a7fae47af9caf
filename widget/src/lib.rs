//! Embeddable chat widget and search overlay core.
//!
//! SYSTEM CONTEXT
//! ==============
//! A host (browser shim, terminal, test harness) owns the actual pixels. It
//! forwards user events into a [`ChatWidget`] or [`SearchOverlay`] and
//! implements a surface trait ([`ChatSurface`], [`SearchSurface`]) that the
//! controllers drive. All network traffic goes through the transport traits
//! in [`net`], so the submit/receive logic runs without a DOM or a backend.
//!
//! Each controller instance owns its configuration, conversation, and
//! pending-request slot. Nothing is shared between instances.

pub mod chat;
pub mod config;
pub mod i18n;
pub mod net;
pub mod render;
pub mod search;
pub mod state;
pub mod surface;

pub use chat::{ChatWidget, Key, SubmitOutcome, WidgetEvent};
pub use config::{Position, SearchConfig, WidgetConfig};
pub use i18n::Language;
pub use net::{ChatTransport, HttpTransport, SearchTransport, TransportError};
pub use search::{SearchEvent, SearchOutcome, SearchOverlay};
pub use state::{Conversation, DocType, Message, Phase, SearchFilters, Visibility};
pub use surface::{ChatSurface, Notice, SearchSurface};

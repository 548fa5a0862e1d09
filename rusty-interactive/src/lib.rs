//! Interactive message sessions for the bot: paginators, selections and ad-hoc event waits.
//!
//! Commands send a widget through [`InteractiveService`], which binds it to the sent message,
//! routes gateway events to it and applies the widget's stop policy once it ends.

mod callback;
pub mod components;
mod config;
pub mod emote;
pub mod error;
pub mod event;
pub mod flags;
pub mod http;
pub mod page;
pub mod paginator;
mod registry;
pub mod result;
mod router;
pub mod selection;
mod service;
pub mod stop;
pub mod timeout;

pub use callback::{EventAction, EventFilter, RESTRICTED_INPUT_MESSAGE};
pub use config::InteractiveConfig;
pub use emote::Emote;
pub use error::{InteractiveError, PlatformError, Result};
pub use event::{
    IncomingInteraction, IncomingMessage, IncomingReaction, InteractionPayload, InteractiveEvent,
    SourceMessage,
};
pub use flags::{ActionOnStop, InputStatus, InputType, RestrictedInputBehavior, WidgetStatus};
pub use http::{InteractiveHttp, MessageHandle};
pub use page::Page;
pub use paginator::{PageSource, Paginator, PaginatorAction, PaginatorConfig, PaginatorControl};
pub use result::{InteractiveResult, InteractiveStatus, Outcome, PaginatorResult, StopWitness};
pub use selection::{Selection, SelectionConfig};
pub use service::{InteractiveService, MessageTarget};
pub use stop::{StopContext, apply_stop_action};
pub use timeout::TimeoutSource;

//! Blog view
//!
//! - [`state`]  -- the explicit view state container
//! - [`app`]    -- [`BlogApp`], the handlers that drive state transitions
//! - [`render`] -- text rendering of the state

pub mod app;
pub mod render;
pub mod state;

pub use app::{BlogApp, PostLookup, SubmitOutcome, ViewOptions, LOGIN_REQUIRED_ALERT};
pub use render::RenderOptions;
pub use state::{DraftField, DraftPost, ViewPhase, ViewState};

//! Delegated language-model services.
//!
//! The classifier and synthesizer both talk to a [`TextModel`]; the
//! live implementation is an OpenAI-compatible chat-completions client,
//! and [`FixtureModel`] replays recorded outputs for deterministic
//! tests.

mod api;
mod fixture;
mod traits;

pub use api::ApiTextModel;
pub use fixture::FixtureModel;
pub use traits::{CompletionRequest, TextModel};

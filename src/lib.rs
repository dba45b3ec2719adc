//! ArtRestorer AI turns structured descriptions of damaged artworks into
//! restoration guidance from Google's Gemini models.
//!
//! The crate is organized in a few layers:
//! - [`api`] holds the Gemini REST payloads and the HTTP client.
//! - [`core`] owns credential resolution, model selection, the fail-soft
//!   generation client, session state, and the page/panel router.
//! - [`cli`] parses arguments and drives the interactive shell and the
//!   one-shot commands.
//!
//! The binary (`src/main.rs`) only calls [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;

//! Generative text wrapper for the interaction checker.
//!
//! This crate turns raw side-effect text into plain-language summaries,
//! fetches short drug briefs, answers interaction questions in a chat
//! session, and drafts animation scripts, using a hosted text-generation
//! API behind the [`TextGenerator`] trait.

pub mod chat;
pub mod client;
pub mod drug_info;
pub mod extraction;
pub mod prompts;
pub mod summarizer;

pub use chat::*;
pub use client::*;
pub use drug_info::*;
pub use extraction::*;
pub use prompts::*;
pub use summarizer::*;

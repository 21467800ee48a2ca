//! Concierge: tool-call dispatch and run completion for a hosted
//! assistant API.
//!
//! A turn appends a user message to a conversation thread, starts a run and
//! observes it by polling or streaming. Whenever the run asks for local
//! function calls, the registered tools are executed and their results are
//! submitted as one batch before observation resumes.

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod tools;
pub mod types;

//! Text-generation client and response coercion.

mod client;
pub mod coerce;
mod types;

pub use client::{ChatClient, GenerativeTextClient};
pub use coerce::{coerce_to_mapping, strip_fences};
pub use types::{build_messages, ChatRequest, Message, ResponseFormat, Usage};

//! API translation between Anthropic and Gemini Code Assist formats.
//!
//! The core of the proxy: converts requests and non-streaming responses
//! between the two API formats. All translation functions are pure (no I/O).

pub mod anthropic_types;
pub mod content;
pub mod gemini_types;
pub mod pairing;
pub mod request;
pub mod response;
pub mod schema;

//! Pipeline stages for turning a document into learning material.
//!
//! Each submodule implements one step and is testable on its own; the
//! generation transport is a trait object so tests never touch the network.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ llm ──▶ shape ──▶ (fallback)
//! (source)  (cleanup)    (retry,   (typed
//!                         decode)   lists)
//! ```
//!
//! 1. [`input`]     — resolve an upload, URL or raw text to document text
//! 2. [`normalize`] — deterministic repair of extracted text, then the size cap
//! 3. [`llm`]       — attempt loop over a [`transport`]; unwraps code fences and
//!    decodes strict JSON, falling back to [`markdown_quiz`]
//! 4. [`shape`]     — check a decoded value is a non-empty list of the
//!    expected items
//! 5. [`fallback`]  — canned content when generation or shape checking fails

pub mod fallback;
pub mod input;
pub mod llm;
pub mod markdown_quiz;
pub mod normalize;
pub mod shape;
pub mod transport;

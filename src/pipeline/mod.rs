//! Pipeline stages, in execution order:
//!
//! 1. [`extract`] — PDF bytes to plain text
//! 2. [`split`] — plain text to candidate modules
//! 3. [`curriculum`] — modules to a structured curriculum via chat completion
//! 4. [`image`] — illustration generation
//! 5. [`storage`] — S3 persistence of generated images
//! 6. [`publish`] — LMS course and slide creation
//!
//! Stages 1–2 are pure and synchronous; the rest talk to external services.
//! Orchestration lives in [`crate::generate`].

pub mod curriculum;
pub mod extract;
pub mod image;
pub mod publish;
pub mod split;
pub mod storage;

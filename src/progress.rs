//! Progress reporting for long-running generation runs.
//!
//! A single generation makes one chat call plus one image call per module,
//! each of which can take tens of seconds. The library itself stays silent on
//! stdout; callers that want live feedback (the CLI renders an indicatif bar)
//! implement [`GenerationProgress`] and register it on
//! [`crate::GenerationConfig::progress`]. All methods have no-op defaults so
//! implementors override only what they render.

/// Coarse pipeline stage markers, fired in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Extracting text from the PDF.
    Extracting,
    /// Splitting extracted text into candidate modules.
    Splitting,
    /// Waiting on the curriculum chat completion.
    Curriculum,
    /// Generating the course cover illustration.
    CoverImage,
    /// Generating per-module illustrations.
    ModuleImages,
}

/// Observer for generation progress. All methods are optional.
pub trait GenerationProgress: Send + Sync {
    /// A pipeline stage is starting.
    fn on_stage(&self, _stage: Stage) {}

    /// Module illustration `number` (1-based) of `total` is starting.
    fn on_module_image_start(&self, _number: u32, _total: usize) {}

    /// Module illustration `number` finished; `ok` is false when the outcome
    /// carries an [`crate::error::ArtifactError`].
    fn on_module_image_complete(&self, _number: u32, _total: usize, _ok: bool) {}

    /// The whole run finished.
    fn on_complete(&self, _modules: usize, _images_generated: usize, _images_failed: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        stages: AtomicUsize,
    }

    impl GenerationProgress for Counter {
        fn on_stage(&self, _stage: Stage) {
            self.stages.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let c = Counter {
            stages: AtomicUsize::new(0),
        };
        c.on_stage(Stage::Extracting);
        c.on_module_image_start(1, 3);
        c.on_module_image_complete(1, 3, true);
        c.on_complete(3, 3, 0);
        assert_eq!(c.stages.load(Ordering::SeqCst), 1);
    }
}

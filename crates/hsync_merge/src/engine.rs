//! Three-way merge on top of a [`MergePrimitive`].

use crate::patch::{MergePrimitive, TextPatcher};
use tracing::debug;

/// Combines a replica's edit with the server's independently evolved content.
///
/// The replica's change is the edit script from `base` to `latest`; the merge
/// applies that script to `current`. Hunks that no longer fit `current` are
/// silently dropped, so the result may lose part of the replica's edit.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine<P: MergePrimitive = TextPatcher> {
    primitive: P,
}

impl MergeEngine<TextPatcher> {
    /// Creates an engine using the default [`TextPatcher`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: MergePrimitive> MergeEngine<P> {
    /// Creates an engine over a custom primitive.
    pub fn with_primitive(primitive: P) -> Self {
        Self { primitive }
    }

    /// Returns the underlying primitive.
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Merges `base -> latest` into `current`.
    ///
    /// - `base == latest`: returns `current` unchanged.
    /// - `base == ""`: the replica's whole content is inserted, which equals
    ///   `latest` only when `current` is empty as well.
    pub fn three_way(&self, base: &str, latest: &str, current: &str) -> String {
        if base == latest {
            return current.to_string();
        }

        let patch = self.primitive.make_patch(base, latest);
        let outcome = self.primitive.apply_patch(&patch, current);

        let dropped = outcome.dropped();
        if dropped > 0 {
            debug!(hunks = patch.len(), dropped, "merge dropped hunks without context");
        }

        outcome.text
    }
}

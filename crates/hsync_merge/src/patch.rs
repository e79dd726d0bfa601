//! Edit scripts and their best-effort application.

use similar::{capture_diff_slices_deadline, group_diff_ops, Algorithm};
use std::time::{Duration, Instant};

/// Default number of unchanged characters kept on each side of a change.
const DEFAULT_CONTEXT: usize = 4;

/// Default search radius, in characters, around a hunk's expected location.
const DEFAULT_MATCH_DISTANCE: usize = 1000;

/// Default time budget for computing one diff.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Computes and applies edit scripts.
///
/// This is the low-level capability the merge is built on. Application is
/// best-effort by contract: it never fails, it only reports which hunks it
/// could not place.
pub trait MergePrimitive: Send + Sync {
    /// Computes the edit script that turns `base` into `other`.
    fn make_patch(&self, base: &str, other: &str) -> Patch;

    /// Applies `patch` to `target`, skipping hunks whose context is missing.
    fn apply_patch(&self, patch: &Patch, target: &str) -> PatchOutcome;
}

/// One contiguous change plus its surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Character offset of `before` in the text the patch was made from.
    pub old_start: usize,
    /// Context and removed text, as it appeared in the base.
    pub before: String,
    /// Context and inserted text, as it should read afterwards.
    pub after: String,
}

/// An ordered edit script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    hunks: Vec<Hunk>,
}

impl Patch {
    /// Creates a patch from hunks ordered by `old_start`.
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    /// Returns the hunks.
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Returns the number of hunks.
    pub fn len(&self) -> usize {
        self.hunks.len()
    }
}

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The patched text.
    pub text: String,
    /// Whether each hunk was placed, in patch order.
    pub applied: Vec<bool>,
}

impl PatchOutcome {
    /// Returns the number of hunks that could not be placed.
    pub fn dropped(&self) -> usize {
        self.applied.iter().filter(|ok| !**ok).count()
    }
}

/// Character-level patcher in the style of diff-match-patch.
///
/// Diffs with Myers over `char`s and groups changes into hunks with a few
/// characters of context. On application each hunk is located by exact match
/// of its `before` text nearest to where it is expected, accounting for the
/// shift introduced by earlier hunks.
///
/// Diffing stops refining once the timeout passes and reports the remaining
/// span as one replacement. The patch is coarser but still exact.
#[derive(Debug, Clone)]
pub struct TextPatcher {
    context: usize,
    match_distance: usize,
    timeout: Option<Duration>,
}

impl TextPatcher {
    /// Creates a patcher with default context and match distance.
    pub fn new() -> Self {
        Self {
            context: DEFAULT_CONTEXT,
            match_distance: DEFAULT_MATCH_DISTANCE,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Sets the number of context characters on each side of a change.
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    /// Sets how far from its expected location a hunk may be found.
    pub fn with_match_distance(mut self, distance: usize) -> Self {
        self.match_distance = distance;
        self
    }

    /// Sets the time budget for one diff, `None` for no limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for TextPatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MergePrimitive for TextPatcher {
    fn make_patch(&self, base: &str, other: &str) -> Patch {
        let old: Vec<char> = base.chars().collect();
        let new: Vec<char> = other.chars().collect();

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let ops = capture_diff_slices_deadline(Algorithm::Myers, &old, &new, deadline);
        let hunks = group_diff_ops(ops, self.context)
            .into_iter()
            .filter_map(|group| {
                let first = group.first()?;
                let last = group.last()?;
                let old_range = first.old_range().start..last.old_range().end;
                let new_range = first.new_range().start..last.new_range().end;
                Some(Hunk {
                    old_start: old_range.start,
                    before: old[old_range].iter().collect(),
                    after: new[new_range].iter().collect(),
                })
            })
            .collect();

        Patch::new(hunks)
    }

    fn apply_patch(&self, patch: &Patch, target: &str) -> PatchOutcome {
        let mut text: Vec<char> = target.chars().collect();
        let mut applied = Vec::with_capacity(patch.len());
        // Shift between base offsets and offsets in `text`.
        let mut delta: isize = 0;

        for hunk in patch.hunks() {
            let before: Vec<char> = hunk.before.chars().collect();
            let after: Vec<char> = hunk.after.chars().collect();
            let expected = (hunk.old_start as isize + delta).clamp(0, text.len() as isize) as usize;

            let found = if before.is_empty() {
                Some(expected)
            } else {
                find_nearest(&text, &before, expected, self.match_distance)
            };

            match found {
                Some(pos) => {
                    text.splice(pos..pos + before.len(), after.iter().copied());
                    delta = pos as isize - hunk.old_start as isize + after.len() as isize
                        - before.len() as isize;
                    applied.push(true);
                }
                None => applied.push(false),
            }
        }

        PatchOutcome {
            text: text.into_iter().collect(),
            applied,
        }
    }
}

/// Finds the occurrence of `needle` closest to `expected` within `max_distance`.
fn find_nearest(
    haystack: &[char],
    needle: &[char],
    expected: usize,
    max_distance: usize,
) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last_start = haystack.len() - needle.len();
    let lo = expected.saturating_sub(max_distance);
    let hi = expected.saturating_add(max_distance).min(last_start);
    if lo > hi {
        return None;
    }

    (lo..=hi)
        .filter(|&pos| haystack[pos..pos + needle.len()] == *needle)
        .min_by_key(|&pos| pos.abs_diff(expected))
}

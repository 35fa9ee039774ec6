// SPDX-License-Identifier: MIT
//
// Contrast cache: memoized minimum-contrast adjustments.
//
// Contrast enforcement walks a color toward black or white one 10% step at a
// time, recomputing luminance at every step. The same (background,
// foreground) pair shows up on every line of a typical log, so the outcome
// is remembered per pair, including the common "already readable" outcome.
//
// Keys are the raw color specs, not resolved RGB; a hit skips the walk
// only. The cache only grows; `Converter::reset` empties it.

use std::collections::HashMap;

use tint_color::Rgb;

use crate::attr::ColorSpec;

/// Identity of one contrast computation.
///
/// `fg` is the foreground after bold-bright remapping. `inverse` is part of
/// the key because a `Default` slot names a different theme color under
/// inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContrastKey {
    pub bg: ColorSpec,
    pub fg: ColorSpec,
    pub inverse: bool,
}

/// Adjusted foreground per key; a stored `None` means "no adjustment".
#[derive(Debug, Default)]
pub struct ContrastCache {
    entries: HashMap<ContrastKey, Option<Rgb>>,
}

impl ContrastCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer `None` is a miss; `Some(None)` is a cached "no adjustment".
    #[inline]
    #[must_use]
    pub fn get(&self, key: &ContrastKey) -> Option<Option<Rgb>> {
        self.entries.get(key).copied()
    }

    #[inline]
    pub fn insert(&mut self, key: ContrastKey, adjusted: Option<Rgb>) {
        self.entries.insert(key, adjusted);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

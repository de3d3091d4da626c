//! Update selection.
//!
//! Picks the best update for a platform out of a manifest. Selection is a
//! running maximum over the matching entries, never a sort: among equal
//! versions the earliest entry in the manifest wins.

use crate::manifest::{PlatformUpdates, Update};

/// Update resolver - pure functions over a decoded manifest.
pub struct UpdateResolver;

impl UpdateResolver {
    /// Resolve the update for `platform`.
    ///
    /// Returns the best stable update, or the best pre-release when
    /// `include_pre_release` is set and it is strictly newer than the best
    /// stable one. `None` when the manifest has no entry for the platform.
    pub fn resolve<'a>(
        updates: &'a PlatformUpdates,
        platform: &str,
        include_pre_release: bool,
    ) -> Option<&'a Update> {
        let stable = Self::find_latest_stable(updates, platform)?;
        if !include_pre_release {
            return Some(stable);
        }

        match Self::find_latest_pre_release(updates, platform) {
            Some(pre) if pre.version().is_newer_than(&stable.version()) => Some(pre),
            _ => Some(stable),
        }
    }

    /// Newest stable update among the entries for `platform`.
    pub fn find_latest_stable<'a>(
        updates: &'a PlatformUpdates,
        platform: &str,
    ) -> Option<&'a Update> {
        Self::running_max(updates.for_platform(platform).map(|p| &p.update))
    }

    /// Newest pre-release among the entries for `platform` that carry one.
    pub fn find_latest_pre_release<'a>(
        updates: &'a PlatformUpdates,
        platform: &str,
    ) -> Option<&'a Update> {
        Self::running_max(
            updates
                .for_platform(platform)
                .filter_map(|p| p.pre_release.as_ref()),
        )
    }

    /// Keeps the first candidate and replaces it only with strictly newer ones.
    fn running_max<'a>(candidates: impl Iterator<Item = &'a Update>) -> Option<&'a Update> {
        candidates.fold(None, |best, candidate| match best {
            Some(current) if !candidate.version().is_newer_than(&current.version()) => {
                Some(current)
            }
            _ => Some(candidate),
        })
    }
}

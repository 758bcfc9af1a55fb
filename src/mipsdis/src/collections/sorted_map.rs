/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_map::{self, BTreeMap};
use alloc::vec::Vec;
use core::ops::{Add, RangeBounds};

use ::polonius_the_crab::prelude::*;

use crate::addresses::Size;

/// Types which know the size of the address-like value they represent.
///
/// Used by the addended lookups: a predecessor entry only covers `key` while
/// `key < entry_key + size`. A `None` size means the extent is unknown, which
/// makes upper-limit-checked lookups miss on purpose.
pub trait SizedAddress {
    fn size(&self) -> Option<Size>;
}

/// An ordered associative container keyed by address.
///
/// Plain point lookups are `O(log n)`; range scans are `O(log n + k)` and
/// always ascending, so iterating this map from output-producing code is
/// deterministic.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortedMap<K, V>
where
    K: Ord,
{
    inner: BTreeMap<K, V>,
}

impl<K, V> SortedMap<K, V>
where
    K: Ord,
{
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn pop(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<K, V> {
        self.inner.iter()
    }

    pub fn values(&self) -> btree_map::Values<K, V> {
        self.inner.values()
    }

    pub fn range<R>(&self, range: R) -> btree_map::Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        self.inner.range(range)
    }

    pub fn range_mut<R>(&mut self, range: R) -> btree_map::RangeMut<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        self.inner.range_mut(range)
    }
}

impl<K, V> SortedMap<K, V>
where
    K: Ord + Copy,
{
    /// The greatest entry whose key is `<= key` (or `< key` when not
    /// `inclusive`).
    #[must_use]
    pub fn key_right(&self, key: K, inclusive: bool) -> Option<(&K, &V)> {
        if inclusive {
            self.inner.range(..=key).next_back()
        } else {
            self.inner.range(..key).next_back()
        }
    }

    /// The least entry whose key is `>= key` (or `> key` when not
    /// `inclusive`).
    #[must_use]
    pub fn key_left(&self, key: K, inclusive: bool) -> Option<(&K, &V)> {
        if inclusive {
            self.inner.range(key..).next()
        } else {
            let mut range = self.inner.range(key..);
            let first = range.next()?;
            if *first.0 == key {
                range.next()
            } else {
                Some(first)
            }
        }
    }

    /// Removes and returns every entry in `[lo, hi)`, in ascending order.
    pub fn range_and_pop(&mut self, lo: K, hi: K) -> Vec<(K, V)> {
        let keys: Vec<K> = self.inner.range(lo..hi).map(|(k, _)| *k).collect();

        keys.into_iter()
            .map(|k| {
                let v = self.inner.remove(&k).expect("This should not panic");
                (k, v)
            })
            .collect()
    }
}

impl<K, V> SortedMap<K, V>
where
    K: Ord + Copy + Add<Size, Output = K>,
    V: SizedAddress,
{
    #[must_use]
    pub fn find(&self, key: &K, settings: FindSettings) -> Option<&V> {
        if !settings.allow_addend {
            self.inner.get(key)
        } else {
            let mut range = self.inner.range(..=key);

            if let Some((other_key, v)) = range.next_back() {
                if other_key == key {
                    Some(v)
                } else if settings.check_upper_limit {
                    v.size().and_then(|siz| {
                        if *key < *other_key + siz {
                            Some(v)
                        } else {
                            None
                        }
                    })
                } else {
                    Some(v)
                }
            } else {
                None
            }
        }
    }

    #[must_use]
    pub fn find_mut(&mut self, key: &K, settings: FindSettings) -> Option<&mut V> {
        if !settings.allow_addend {
            self.inner.get_mut(key)
        } else {
            let mut range = self.inner.range_mut(..=key);

            if let Some((other_key, v)) = range.next_back() {
                if other_key == key {
                    Some(v)
                } else if settings.check_upper_limit {
                    v.size().and_then(|siz| {
                        if *key < *other_key + siz {
                            Some(v)
                        } else {
                            None
                        }
                    })
                } else {
                    Some(v)
                }
            } else {
                None
            }
        }
    }

    pub fn find_mut_or_insert_with<F>(&mut self, key: K, settings: FindSettings, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        find_mut_or_insert_with_impl(self, key, settings, default)
    }
}

// TODO: get rid of the polonius stuff when the new borrow checker has been released.
fn find_mut_or_insert_with_impl<'slf, K, V, F>(
    mut slf: &'slf mut SortedMap<K, V>,
    key: K,
    settings: FindSettings,
    default: F,
) -> &'slf mut V
where
    K: Ord + Copy + Add<Size, Output = K>,
    V: SizedAddress,
    F: FnOnce() -> V,
{
    polonius!(|slf| -> &'polonius mut V {
        if let Some(x) = slf.find_mut(&key, settings) {
            polonius_return!(x);
        }
    });

    slf.inner.entry(key).or_insert_with(default)
}

impl<K, V> Default for SortedMap<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a SortedMap<K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for SortedMap<K, V>
where
    K: Ord,
{
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FindSettings {
    allow_addend: bool,
    check_upper_limit: bool,
}

impl FindSettings {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_addend: true,
            check_upper_limit: true,
        }
    }

    #[must_use]
    pub const fn with_allow_addend(self, allow_addend: bool) -> Self {
        Self {
            allow_addend,
            ..self
        }
    }

    #[must_use]
    pub const fn with_check_upper_limit(self, check_upper_limit: bool) -> Self {
        Self {
            check_upper_limit,
            ..self
        }
    }

    #[must_use]
    pub const fn allow_addend(&self) -> bool {
        self.allow_addend
    }

    #[must_use]
    pub const fn check_upper_limit(&self) -> bool {
        self.check_upper_limit
    }
}

impl Default for FindSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::Vram;
    use pretty_assertions::assert_eq;

    impl SizedAddress for Option<Size> {
        fn size(&self) -> Option<Size> {
            *self
        }
    }

    #[test]
    fn range_matches_filter() {
        let mut map: SortedMap<u32, u32> = SortedMap::new();
        for k in [0x30, 0x10, 0x20, 0x40] {
            map.insert(k, k * 2);
        }

        let keys: Vec<u32> = map.range(0x10..0x40).map(|(k, _)| *k).collect();
        assert_eq!(keys, [0x10, 0x20, 0x30]);
    }

    #[test]
    fn key_right_is_predecessor() {
        let mut map: SortedMap<u32, u32> = SortedMap::new();
        map.insert(0x10, 1);
        map.insert(0x20, 2);

        assert_eq!(map.key_right(0x20, true), Some((&0x20, &2)));
        assert_eq!(map.key_right(0x20, false), Some((&0x10, &1)));
        assert_eq!(map.key_right(0x1F, true), Some((&0x10, &1)));
        assert_eq!(map.key_right(0x0F, true), None);
    }

    #[test]
    fn key_left_is_successor() {
        let mut map: SortedMap<u32, u32> = SortedMap::new();
        map.insert(0x10, 1);
        map.insert(0x20, 2);

        assert_eq!(map.key_left(0x10, true), Some((&0x10, &1)));
        assert_eq!(map.key_left(0x10, false), Some((&0x20, &2)));
        assert_eq!(map.key_left(0x21, true), None);
    }

    #[test]
    fn range_and_pop_removes_ascending() {
        let mut map: SortedMap<u32, u32> = SortedMap::new();
        for k in [0x30, 0x10, 0x20, 0x40] {
            map.insert(k, k);
        }

        let popped: Vec<u32> = map.range_and_pop(0x10, 0x40).into_iter().map(|(k, _)| k).collect();
        assert_eq!(popped, [0x10, 0x20, 0x30]);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&0x40));
    }

    #[test]
    fn find_misses_on_unknown_size_with_upper_limit() {
        let mut map: SortedMap<Vram, Option<Size>> = SortedMap::new();
        map.insert(Vram::new(0x80001000), None);

        // Exact hit regardless of size.
        assert!(map.find(&Vram::new(0x80001000), FindSettings::new()).is_some());
        // Addended lookup with unknown size and upper-limit checking misses.
        assert!(map.find(&Vram::new(0x80001004), FindSettings::new()).is_none());
        // Without upper-limit checking the predecessor wins.
        assert!(map
            .find(
                &Vram::new(0x80001004),
                FindSettings::new().with_check_upper_limit(false)
            )
            .is_some());
    }

    #[test]
    fn find_respects_size() {
        let mut map: SortedMap<Vram, Option<Size>> = SortedMap::new();
        map.insert(Vram::new(0x80001000), Some(Size::new(0x10)));

        assert!(map.find(&Vram::new(0x8000100F), FindSettings::new()).is_some());
        assert!(map.find(&Vram::new(0x80001010), FindSettings::new()).is_none());
        assert!(map
            .find(
                &Vram::new(0x80001008),
                FindSettings::new().with_allow_addend(false)
            )
            .is_none());
    }
}

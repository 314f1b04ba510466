//! Collection type aliases.

use crate::hash::FastBuildHasher;

/// A hash set based on the standard library's ([`HashSet`][std::collections::HashSet]) using [`FastHasher`][crate::hash::FastHasher].
pub type FastHashSet<T> = std::collections::HashSet<T, FastBuildHasher>;

/// A hash map based on the standard library's ([`HashMap`][std::collections::HashMap]) using [`FastHasher`][crate::hash::FastHasher].
pub type FastHashMap<K, V> = std::collections::HashMap<K, V, FastBuildHasher>;

//! Hashing primitives.

/// A fast, non-cryptographic hash implementation that is optimized for quality.
///
/// The implementation is reasonably suitable for hash tables and other data structures that require fast hashing and
/// some degree of collision resistance.
///
/// Currently, [`foldhash`][foldhash] is used as the underlying implementation.
///
/// [foldhash]: http://github.com/orlp/foldhash
pub type FastHasher = foldhash::quality::FoldHasher;

/// [`BuildHasher`][std::hash::BuildHasher] implementation for [`FastHasher`].
pub type FastBuildHasher = foldhash::quality::RandomState;

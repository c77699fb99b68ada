//! Cache versions for compiled code
//!
//! A compiled unit is reused only while the versions of all its operators are
//! unchanged. An empty version means "never cache".

use std::fmt;

/// Base version shared by every operator's emission logic.
pub const BASE_CACHE_VERSION: &[u32] = &[4];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheVersion(Vec<u32>);

impl CacheVersion {
    pub fn new(parts: Vec<u32>) -> Self {
        Self(parts)
    }

    pub fn base() -> Self {
        Self(BASE_CACHE_VERSION.to_vec())
    }

    /// Version of code that must not be cached.
    pub fn unversioned() -> Self {
        Self(Vec::new())
    }

    pub fn is_cacheable(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    /// `prefix` followed by this version. Unversioned stays unversioned.
    pub fn prepend(self, prefix: &[u32]) -> Self {
        if !self.is_cacheable() {
            return self;
        }
        let mut parts = prefix.to_vec();
        parts.extend(self.0);
        Self(parts)
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend() {
        let v = CacheVersion::new(vec![7, 1]).prepend(&[2]);
        assert_eq!(v.parts(), &[2, 7, 1]);
        assert_eq!(v.to_string(), "(2, 7, 1)");
        assert_eq!(CacheVersion::base().prepend(&[]), CacheVersion::base());
    }

    #[test]
    fn test_unversioned_stays_unversioned() {
        let v = CacheVersion::unversioned().prepend(&[2]);
        assert!(!v.is_cacheable());
        assert_eq!(v.to_string(), "()");
    }
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// Records carrying a unique, human-facing name.
///
/// Goods, hunters and merchants are all referenced by name from the
/// transaction API, so name lookup is part of the domain contract.
pub trait Named {
    /// Returns the unique display name used for lookups.
    fn name(&self) -> &str;
}

//! Shared primitive types used across the whole crate.

/// Stable ordinal identifier for a player, assigned at roster creation.
pub type PlayerId = u32;

/// A duration or balance measured in whole seconds. Signed: efficiency
/// scores go negative, time banks never do (callers clamp).
pub type Seconds = i64;

/// Wall-clock instant in milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Round counter. The first round is round 1.
pub type Round = u32;

//! Error taxonomy.
//!
//! No `thiserror`/`anyhow` here, matching the source's own `io::BuildError`:
//! plain closed enums, no `std::error::Error` impl, no panics. Structural
//! misuse is reported through these types; malformed-but-not-structurally-
//! broken input (a negative growth, a degenerate AABB) is handled locally
//! with a documented fallback instead of ever reaching a caller.

/// Raised by `ObjectBvh::validate` / `MeshBvh` internal consistency checks.
/// Never constructed from a panic path — `validate` collects every finding
/// it can before returning, so a single pass may yield several of these.
///
/// "A leaf with children" and "an internal node missing a left child" are
/// not among these variants: `NodeKind`'s `Leaf(L)`/`Internal { left,
/// right }` tagging makes both structurally unrepresentable, so there is
/// nothing for `validate` to ever catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The child/parent graph contains a cycle.
    CycleDetected { node: u32 },
    /// A node's `parent` points to a node that does not list it as a child.
    DanglingParent { node: u32 },
    /// `node.depth` does not equal its distance from the root.
    DepthMismatch { node: u32, expected: u32, actual: u32 },
    /// Two leaves carry the same `object_id`.
    DuplicateId { object_id: u64 },
    /// `object_map` names a node that no longer carries a matching leaf.
    MissingMapEntry { object_id: u64 },
}

/// Raised by query entry points on clearly malformed parameters —
/// "invalid-input" in the error taxonomy, distinct from "not-found" (which
/// is represented as `Option::None`/`false`, never as an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    NegativeRadius,
    NegativeMaxDistance,
}

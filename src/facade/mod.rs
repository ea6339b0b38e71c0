//! Integration facade: couples the object BVH to an external scene-graph
//! tick loop. Registration, dirty tracking, scheduled refit/rebuild policy,
//! and the five query passthroughs live here; see `facade::facade` for the
//! `Facade` type itself and `facade::active` for the process-wide active
//! slot.

mod active;
mod collider;
mod facade;

pub use active::{initialize, is_active, teardown, with_active};
pub use collider::Collider;
pub use facade::{Facade, FacadeConfig};

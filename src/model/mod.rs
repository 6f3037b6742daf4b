//! Typed domain objects produced by materialization
//!
//! Everything here is a transient value object: created fresh per call,
//! serializable, and never written back to the graph.

pub mod classification;
pub mod entity;
pub mod relationship;
pub mod value;

pub use classification::{Classification, TimeBoundary};
pub use entity::{EntitiesWithExtInfo, EntityDetail, EntityHeader, EntityStatus, EntityWithExtInfo, ExtendedInfo};
pub use relationship::{PropagateTags, Relationship};
pub use value::{AttributeMap, ObjectId, RelatedObjectId, Scalar, StructValue, TypedValue};

//! Repository errors
//!
//! Every variant carries enough context (type name, attribute name, graph
//! element) to diagnose a stale or mismatched type registry.

use crate::graph::{ElementId, GraphError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// Requested vertex, edge or guid is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// A type name could not be resolved, or stored data does not match the
    /// declared type
    #[error("Invalid type {type_name} at {element}: {reason}")]
    InvalidType {
        type_name: String,
        element: ElementId,
        reason: String,
    },

    /// A relationship attribute has no matching end definition
    #[error("Invalid relationship definition {relationship_type} for attribute {type_name}.{attribute} at {element}")]
    InvalidRelationshipDefinition {
        relationship_type: String,
        type_name: String,
        attribute: String,
        element: ElementId,
    },

    /// One classification's propagation step could not complete
    #[error("Propagation of {classification} across {element} failed: {reason}")]
    PropagationStepFailed {
        classification: String,
        element: ElementId,
        reason: String,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl RepositoryError {
    pub fn invalid_type(type_name: impl Into<String>, element: impl Into<ElementId>, reason: impl Into<String>) -> Self {
        RepositoryError::InvalidType {
            type_name: type_name.into(),
            element: element.into(),
            reason: reason.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

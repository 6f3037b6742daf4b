//! Relationship instances and propagation modes

use super::entity::EntityStatus;
use super::value::{AttributeMap, ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction in which classifications flow across a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropagateTags {
    #[default]
    None,
    OneToTwo,
    TwoToOne,
    Both,
}

impl PropagateTags {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagateTags::None => "NONE",
            PropagateTags::OneToTwo => "ONE_TO_TWO",
            PropagateTags::TwoToOne => "TWO_TO_ONE",
            PropagateTags::Both => "BOTH",
        }
    }

    /// Classifications on end1 flow to end2
    pub fn flows_end1_to_end2(&self) -> bool {
        matches!(self, PropagateTags::OneToTwo | PropagateTags::Both)
    }

    /// Classifications on end2 flow to end1
    pub fn flows_end2_to_end1(&self) -> bool {
        matches!(self, PropagateTags::TwoToOne | PropagateTags::Both)
    }
}

impl fmt::Display for PropagateTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropagateTags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(PropagateTags::None),
            "ONE_TO_TWO" => Ok(PropagateTags::OneToTwo),
            "TWO_TO_ONE" => Ok(PropagateTags::TwoToOne),
            "BOTH" => Ok(PropagateTags::Both),
            other => Err(format!("unknown propagation mode: {}", other)),
        }
    }
}

/// A relationship materialized from an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub guid: Option<String>,
    pub type_name: String,
    /// Label of the backing edge
    pub label: String,
    pub status: EntityStatus,
    pub version: i64,
    pub propagate_tags: PropagateTags,
    /// The edge's out vertex
    pub end1: ObjectId,
    /// The edge's in vertex
    pub end2: ObjectId,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

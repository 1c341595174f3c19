//! Domain entities: the flat record shapes delivered by the data store

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix used in the textual form of budget-root node ids.
pub const BUDGET_ID_PREFIX: &str = "budget:";

/// Top-level grouping; one forest root per budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
}

impl Budget {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Unit cost line as stored, before it is placed in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: String,
    /// `None` attaches the record directly under its budget root
    #[serde(default)]
    pub parent_id: Option<String>,
    pub budget_id: String,
    /// Structured code such as "01.02"
    #[serde(default)]
    pub numbering: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_cost: f64,
    /// quantity × unit cost, as supplied
    #[serde(default)]
    pub partial_cost: f64,
    /// "N" marks a neutral node whose level color is suppressed
    #[serde(default)]
    pub status: String,
}

impl CostRecord {
    /// Minimal record, mostly useful for building fixtures.
    pub fn new(
        id: impl Into<String>,
        parent_id: Option<&str>,
        budget_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            budget_id: budget_id.into(),
            numbering: String::new(),
            description: String::new(),
            unit_id: String::new(),
            quantity: 0.0,
            unit_cost: 0.0,
            partial_cost: 0.0,
            status: String::new(),
        }
    }
}

/// Join entity grouping composition lines under a cost record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtotalLink {
    pub id: String,
    /// The cost record this subtotal group belongs to
    pub cost_id: String,
    /// Optional group label (labor, materials, ...)
    #[serde(default)]
    pub description: Option<String>,
}

impl SubtotalLink {
    pub fn new(id: impl Into<String>, cost_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cost_id: cost_id.into(),
            description: None,
        }
    }
}

/// A single priced line item contributing to a cost record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionLine {
    pub id: String,
    pub subtotal_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub partial_cost: f64,
}

impl CompositionLine {
    pub fn new(id: impl Into<String>, subtotal_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subtotal_id: subtotal_id.into(),
            description: String::new(),
            unit_id: String::new(),
            magnitude: 0.0,
            quantity: 0.0,
            unit_cost: 0.0,
            partial_cost: 0.0,
        }
    }
}

/// Entry of the unit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub abbreviation: String,
    /// Display category (labor, material, equipment, ...)
    #[serde(default)]
    pub category: Option<String>,
}

/// Address of a node in the forest.
///
/// Budget roots and cost records live in separate id spaces, so the key
/// carries which one it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    /// Synthetic root of a budget
    Budget(String),
    /// Node backed by a cost record
    Cost(String),
}

impl NodeId {
    pub fn budget(id: impl Into<String>) -> Self {
        NodeId::Budget(id.into())
    }

    pub fn cost(id: impl Into<String>) -> Self {
        NodeId::Cost(id.into())
    }

    /// The raw identifier without its kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeId::Budget(id) | NodeId::Cost(id) => id,
        }
    }

    pub fn is_budget(&self) -> bool {
        matches!(self, NodeId::Budget(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Budget(id) => write!(f, "{BUDGET_ID_PREFIX}{id}"),
            NodeId::Cost(id) => write!(f, "{id}"),
        }
    }
}

/// `budget:B1` parses to a budget root, anything else to a cost record.
impl FromStr for NodeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.strip_prefix(BUDGET_ID_PREFIX) {
            Some(id) => NodeId::budget(id),
            None => NodeId::cost(s),
        })
    }
}

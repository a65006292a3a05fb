use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A scene that continues along at most one path.
    #[default]
    Regular,
    /// A decision point offering any number of choices.
    Branch,
    /// An ending; no outgoing branches.
    End,
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid NodeType value: {0}")]
    InvalidNodeType(String),
}

impl NodeType {
    /// Upper bound on outgoing branches, `None` when unbounded.
    pub fn max_branches(self) -> Option<usize> {
        match self {
            NodeType::Regular => Some(1),
            NodeType::Branch => None,
            NodeType::End => Some(0),
        }
    }

    pub fn accepts_branch_count(self, count: usize) -> bool {
        self.max_branches().is_none_or(|max| count <= max)
    }

    pub fn default_title(self) -> &'static str {
        match self {
            NodeType::Regular => "New Scene",
            NodeType::Branch => "Decision Point",
            NodeType::End => "The End",
        }
    }

    pub fn default_content(self) -> &'static str {
        match self {
            NodeType::Regular => "Describe what happens in this scene...",
            NodeType::Branch => "Describe the choice the reader is facing...",
            NodeType::End => "Describe how the story ends...",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Regular => "regular",
            NodeType::Branch => "branch",
            NodeType::End => "end",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = EnumConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(NodeType::Regular),
            "branch" => Ok(NodeType::Branch),
            "end" => Ok(NodeType::End),
            _ => Err(EnumConversionError::InvalidNodeType(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_limits() {
        assert!(NodeType::Regular.accepts_branch_count(1));
        assert!(!NodeType::Regular.accepts_branch_count(2));
        assert!(NodeType::End.accepts_branch_count(0));
        assert!(!NodeType::End.accepts_branch_count(1));
        assert!(NodeType::Branch.accepts_branch_count(40));
    }

    #[test]
    fn test_parse_node_type() {
        assert_eq!("Branch".parse::<NodeType>(), Ok(NodeType::Branch));
        assert_eq!(" end ".parse::<NodeType>(), Ok(NodeType::End));
        assert!("chapter".parse::<NodeType>().is_err());
    }
}

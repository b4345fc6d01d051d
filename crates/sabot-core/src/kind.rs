//! Task environment identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of task environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentKind {
    TravelPlanning,
    FinancialArticleWriting,
    CodeGeneration,
    MultiAgentDebate,
}

impl EnvironmentKind {
    pub const ALL: [EnvironmentKind; 4] = [
        EnvironmentKind::TravelPlanning,
        EnvironmentKind::FinancialArticleWriting,
        EnvironmentKind::CodeGeneration,
        EnvironmentKind::MultiAgentDebate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentKind::TravelPlanning => "travel_planning",
            EnvironmentKind::FinancialArticleWriting => "financial_article_writing",
            EnvironmentKind::CodeGeneration => "code_generation",
            EnvironmentKind::MultiAgentDebate => "multi_agent_debate",
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown environment '{s}' (expected one of: {})",
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

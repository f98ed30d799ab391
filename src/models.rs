//! Core data models for agent-ready
//!
//! Levels, pillars and the per-check fact record shared by the
//! predicate engine, the scorers and the report assembler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maturity level. Ordering follows the enum rank, never the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl Level {
    /// All levels, lowest first
    pub const ALL: [Level; 5] = [Level::L1, Level::L2, Level::L3, Level::L4, Level::L5];

    /// Zero-based rank of the level
    pub fn rank(self) -> usize {
        self as usize
    }

    /// The level directly below this one, if any
    pub fn previous(self) -> Option<Level> {
        self.rank().checked_sub(1).map(|i| Level::ALL[i])
    }

    /// The level directly above this one, if any
    pub fn next(self) -> Option<Level> {
        Level::ALL.get(self.rank() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
            Level::L4 => "L4",
            Level::L5 => "L5",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" | "1" => Ok(Level::L1),
            "L2" | "2" => Ok(Level::L2),
            "L3" | "3" => Ok(Level::L3),
            "L4" | "4" => Ok(Level::L4),
            "L5" | "5" => Ok(Level::L5),
            _ => Err(format!("Unknown level '{}'. Valid levels: L1-L5", s)),
        }
    }
}

/// Quality dimension a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Docs,
    Style,
    Build,
    Test,
    Security,
    Observability,
    Env,
    TaskDiscovery,
    Product,
}

/// Static display metadata for a pillar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PillarInfo {
    pub name: &'static str,
    pub name_zh: &'static str,
    pub icon: &'static str,
}

impl Pillar {
    /// All pillars in canonical evaluation order
    pub const ALL: [Pillar; 9] = [
        Pillar::Docs,
        Pillar::Style,
        Pillar::Build,
        Pillar::Test,
        Pillar::Security,
        Pillar::Observability,
        Pillar::Env,
        Pillar::TaskDiscovery,
        Pillar::Product,
    ];

    /// Display metadata table
    pub fn info(self) -> PillarInfo {
        match self {
            Pillar::Docs => PillarInfo {
                name: "Documentation",
                name_zh: "文档",
                icon: "📖",
            },
            Pillar::Style => PillarInfo {
                name: "Style & Validation",
                name_zh: "代码风格",
                icon: "✨",
            },
            Pillar::Build => PillarInfo {
                name: "Build System",
                name_zh: "构建系统",
                icon: "🔧",
            },
            Pillar::Test => PillarInfo {
                name: "Testing",
                name_zh: "测试",
                icon: "🧪",
            },
            Pillar::Security => PillarInfo {
                name: "Security",
                name_zh: "安全",
                icon: "🔒",
            },
            Pillar::Observability => PillarInfo {
                name: "Debugging & Observability",
                name_zh: "可观测性",
                icon: "📊",
            },
            Pillar::Env => PillarInfo {
                name: "Development Environment",
                name_zh: "开发环境",
                icon: "🌍",
            },
            Pillar::TaskDiscovery => PillarInfo {
                name: "Task Discovery",
                name_zh: "任务发现",
                icon: "📋",
            },
            Pillar::Product => PillarInfo {
                name: "Product & Experimentation",
                name_zh: "产品",
                icon: "🚀",
            },
        }
    }

    /// Serialized tag (`task_discovery`, `env`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Pillar::Docs => "docs",
            Pillar::Style => "style",
            Pillar::Build => "build",
            Pillar::Test => "test",
            Pillar::Security => "security",
            Pillar::Observability => "observability",
            Pillar::Env => "env",
            Pillar::TaskDiscovery => "task_discovery",
            Pillar::Product => "product",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluated outcome of one check against one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub check_name: String,
    pub pillar: Pillar,
    pub level: Level,
    pub required: bool,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl CheckResult {
    /// Diagnostic attached by the engine when the check definition was malformed
    pub fn error(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.get("error"))
            .and_then(|v| v.as_str())
    }

    /// First remediation suggestion, if the rubric supplied one
    pub fn first_suggestion(&self) -> Option<&str> {
        self.suggestions
            .as_ref()
            .and_then(|s| s.first())
            .map(String::as_str)
    }
}

/// Integer percentage `round(part / whole * 100)`, 0 when `whole` is 0.
///
/// Halves round up, so 1/8 is 13.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    ((200 * part + whole) / (2 * whole)) as u8
}

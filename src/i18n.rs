//! Localized display strings
//!
//! Reports are produced in English or Chinese. Everything user-facing that
//! depends on the language goes through a [`Localizer`], so embedders can
//! swap in their own tables.

use crate::models::{Level, Pillar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "zh" | "cn" | "chinese" | "zh-cn" => Ok(Language::Zh),
            _ => Err(format!("Unknown language '{}'. Valid languages: en, zh", s)),
        }
    }
}

/// Section labels used by the report renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Summary,
    Details,
    Roadmap,
    QuickWins,
    ShortTerm,
    MediumTerm,
    LongTerm,
    Strengths,
    Weaknesses,
    TechDebt,
}

/// Maps (language, key) to display text
pub trait Localizer: Send + Sync {
    fn pillar_name(&self, language: Language, pillar: Pillar) -> &str;

    /// Name of a level; `None` is the "not achieved" state
    fn level_name(&self, language: Language, level: Option<Level>) -> &str;

    fn label(&self, language: Language, label: Label) -> &str;
}

/// English and Chinese tables compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocalizer;

impl Localizer for BuiltinLocalizer {
    fn pillar_name(&self, language: Language, pillar: Pillar) -> &str {
        match language {
            Language::En => match pillar {
                Pillar::Docs => "Documentation",
                Pillar::Style => "Style & Validation",
                Pillar::Build => "Build System",
                Pillar::Test => "Testing",
                Pillar::Security => "Security",
                Pillar::Observability => "Observability",
                Pillar::Env => "Environment",
                Pillar::TaskDiscovery => "Task Discovery",
                Pillar::Product => "Product",
            },
            Language::Zh => pillar.info().name_zh,
        }
    }

    fn level_name(&self, language: Language, level: Option<Level>) -> &str {
        match (language, level) {
            (Language::En, None) => "Not Achieved",
            (Language::En, Some(Level::L1)) => "Functional",
            (Language::En, Some(Level::L2)) => "Documented",
            (Language::En, Some(Level::L3)) => "Standardized",
            (Language::En, Some(Level::L4)) => "Optimized",
            (Language::En, Some(Level::L5)) => "Autonomous",
            (Language::Zh, None) => "未达标",
            (Language::Zh, Some(Level::L1)) => "基础级",
            (Language::Zh, Some(Level::L2)) => "文档级",
            (Language::Zh, Some(Level::L3)) => "标准级",
            (Language::Zh, Some(Level::L4)) => "优化级",
            (Language::Zh, Some(Level::L5)) => "自治级",
        }
    }

    fn label(&self, language: Language, label: Label) -> &str {
        match language {
            Language::En => match label {
                Label::Title => "Scan Report",
                Label::Summary => "Executive Summary",
                Label::Details => "Detailed Analysis",
                Label::Roadmap => "Improvement Roadmap",
                Label::QuickWins => "Quick Wins",
                Label::ShortTerm => "Short Term",
                Label::MediumTerm => "Medium Term",
                Label::LongTerm => "Long Term",
                Label::Strengths => "Strengths",
                Label::Weaknesses => "Areas for Improvement",
                Label::TechDebt => "Tech Debt",
            },
            Language::Zh => match label {
                Label::Title => "扫描报告",
                Label::Summary => "执行摘要",
                Label::Details => "详细分析",
                Label::Roadmap => "改进路线图",
                Label::QuickWins => "快速改进",
                Label::ShortTerm => "短期目标",
                Label::MediumTerm => "中期目标",
                Label::LongTerm => "长期目标",
                Label::Strengths => "优势",
                Label::Weaknesses => "待改进",
                Label::TechDebt => "技术债务",
            },
        }
    }
}

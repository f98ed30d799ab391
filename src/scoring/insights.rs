//! Cross-pillar insight rules

use super::PillarOutcome;
use crate::models::Pillar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Risk,
    Opportunity,
    Strength,
}

impl InsightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::Risk => "risk",
            InsightKind::Opportunity => "opportunity",
            InsightKind::Strength => "strength",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding that only shows when two pillars are read together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPillarInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub pillars: Vec<Pillar>,
    pub insight_zh: String,
    pub insight_en: String,
    pub recommendation_zh: String,
    pub recommendation_en: String,
}

/// `(first, second, predicate on their scores) → insight`
pub struct InsightRule {
    pub kind: InsightKind,
    pub first: Pillar,
    pub second: Pillar,
    pub applies: fn(u8, u8) -> bool,
    pub insight_zh: &'static str,
    pub insight_en: &'static str,
    pub recommendation_zh: &'static str,
    pub recommendation_en: &'static str,
}

fn both_below_half(a: u8, b: u8) -> bool {
    a < 50 && b < 50
}

fn strong_then_weak(a: u8, b: u8) -> bool {
    a > 70 && b < 50
}

fn both_above_80(a: u8, b: u8) -> bool {
    a > 80 && b > 80
}

/// Evaluated in order; every matching rule contributes one insight
pub const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        kind: InsightKind::Risk,
        first: Pillar::Test,
        second: Pillar::Build,
        applies: both_below_half,
        insight_zh: "检测到测试覆盖率低且无 CI/CD，代码变更风险高",
        insight_en: "Low test coverage with no CI/CD detected - high risk for code changes",
        recommendation_zh: "优先建立 CI 流水线并添加基础测试",
        recommendation_en: "Prioritize CI pipeline setup and add basic tests",
    },
    InsightRule {
        kind: InsightKind::Opportunity,
        first: Pillar::Docs,
        second: Pillar::Env,
        applies: strong_then_weak,
        insight_zh: "文档完善但缺少开发环境配置，新人上手有障碍",
        insight_en: "Good docs but missing dev environment setup - onboarding friction",
        recommendation_zh: "添加 devcontainer 或 docker-compose 配置",
        recommendation_en: "Add devcontainer or docker-compose configuration",
    },
    InsightRule {
        kind: InsightKind::Strength,
        first: Pillar::Security,
        second: Pillar::Style,
        applies: both_above_80,
        insight_zh: "安全配置和代码风格都很完善，代码质量高",
        insight_en: "Strong security and code style configurations - high code quality",
        recommendation_zh: "继续保持当前标准",
        recommendation_en: "Maintain current standards",
    },
];

impl InsightRule {
    fn evaluate(&self, outcomes: &[PillarOutcome]) -> Option<CrossPillarInsight> {
        let score_of = |pillar: Pillar| {
            outcomes
                .iter()
                .find(|o| o.pillar == pillar)
                .map(|o| o.score)
        };
        let (a, b) = (score_of(self.first)?, score_of(self.second)?);

        (self.applies)(a, b).then(|| CrossPillarInsight {
            kind: self.kind,
            pillars: vec![self.first, self.second],
            insight_zh: self.insight_zh.to_string(),
            insight_en: self.insight_en.to_string(),
            recommendation_zh: self.recommendation_zh.to_string(),
            recommendation_en: self.recommendation_en.to_string(),
        })
    }
}

/// Apply [`INSIGHT_RULES`] to a set of pillar outcomes
pub fn cross_pillar_insights(outcomes: &[PillarOutcome]) -> Vec<CrossPillarInsight> {
    INSIGHT_RULES
        .iter()
        .filter_map(|rule| rule.evaluate(outcomes))
        .collect()
}

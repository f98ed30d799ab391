//! Report assembly
//!
//! Converts pillar outcomes and the cross-pillar evaluation into the
//! serializable [`Report`]. Field names and nesting of every type here are
//! part of the JSON output contract.

use crate::i18n::{Language, Localizer};
use crate::models::{percent, CheckResult, Level, Pillar};
use crate::scoring::{CrossPillarInsight, Evaluation, PillarOutcome, PillarSummary};
use crate::snapshot::SnapshotMeta;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const QUICK_WIN_LIMIT: usize = 3;
const SHORT_TERM_LIMIT: usize = 5;
const MEDIUM_TERM_LIMIT: usize = 5;
/// Flat pass threshold for the level-progress chart
const LEVEL_PROGRESS_THRESHOLD: u8 = 60;
const ROADMAP_NEXT_STEPS: usize = 3;

/// Remediation urgency, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Classify a failed fact
    pub fn classify(required: bool, level: Level) -> Self {
        match (required, level) {
            (true, Level::L1) => Priority::Critical,
            (true, _) => Priority::High,
            (false, level) if level <= Level::L2 => Priority::Medium,
            (false, _) => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan context the pipeline hands to the assembler
#[derive(Debug, Clone, PartialEq)]
pub struct RunMeta {
    pub profile: String,
    pub profile_version: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
    pub scan_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub executive_summary: ExecutiveSummary,
    pub detailed_analysis: DetailedAnalysis,
    pub improvement_roadmap: ImprovementRoadmap,
    pub charts: Charts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub repo: String,
    pub commit: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub profile: String,
    pub profile_version: String,
    pub scan_duration_ms: u64,
    /// Number of pillars evaluated
    pub agents_used: usize,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub level: Option<Level>,
    pub score: u8,
    pub headline_zh: String,
    pub headline_en: String,
    pub key_strengths: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub next_steps: Vec<String>,
    pub progress_to_next: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarDetail {
    pub pillar: Pillar,
    pub name: String,
    pub name_zh: String,
    pub icon: String,
    pub level_achieved: Option<Level>,
    pub score: u8,
    pub checks_passed: usize,
    pub checks_total: usize,
    pub checks: Vec<CheckResult>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub pillars: Vec<PillarDetail>,
    pub cross_pillar_insights: Vec<CrossPillarInsight>,
    pub tech_debt_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: Priority,
    pub pillar: Pillar,
    pub level: Level,
    pub check_id: String,
    pub action_zh: String,
    pub action_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl ActionItem {
    pub fn action(&self, language: Language) -> &str {
        match language {
            Language::En => &self.action_en,
            Language::Zh => &self.action_zh,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementRoadmap {
    pub quick_wins: Vec<ActionItem>,
    pub short_term: Vec<ActionItem>,
    pub medium_term: Vec<ActionItem>,
    pub long_term: Vec<ActionItem>,
}

impl ImprovementRoadmap {
    /// All items, most urgent bucket first
    pub fn iter(&self) -> impl Iterator<Item = &ActionItem> {
        self.quick_wins
            .iter()
            .chain(&self.short_term)
            .chain(&self.medium_term)
            .chain(&self.long_term)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub pillar: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: Level,
    pub achieved: bool,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charts {
    pub pillar_radar: Vec<RadarPoint>,
    pub level_progress: Vec<LevelProgress>,
}

/// Builds a [`Report`]; pure apart from the localizer lookups
pub struct ReportAssembler<'a> {
    localizer: &'a dyn Localizer,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(localizer: &'a dyn Localizer) -> Self {
        Self { localizer }
    }

    pub fn assemble(
        &self,
        snapshot: &SnapshotMeta,
        evaluation: &Evaluation,
        outcomes: &[PillarOutcome],
        run: &RunMeta,
    ) -> Report {
        let language = run.language;
        let roadmap = build_roadmap(outcomes);

        Report {
            meta: ReportMeta {
                repo: snapshot.repo_name.clone(),
                commit: snapshot.commit_sha.clone(),
                timestamp: run.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                profile: run.profile.clone(),
                profile_version: run.profile_version.clone(),
                scan_duration_ms: run.scan_duration_ms,
                agents_used: outcomes.len(),
                language,
            },
            executive_summary: ExecutiveSummary {
                level: evaluation.level,
                score: evaluation.overall_score,
                headline_zh: self.headline(Language::Zh, evaluation.level),
                headline_en: self.headline(Language::En, evaluation.level),
                key_strengths: self.ranked(language, &evaluation.strengths),
                critical_gaps: self.ranked(language, &evaluation.weaknesses),
                next_steps: next_steps(language, evaluation.level, &roadmap),
                progress_to_next: evaluation.progress_to_next,
            },
            detailed_analysis: DetailedAnalysis {
                pillars: outcomes.iter().map(|o| self.pillar_detail(o)).collect(),
                cross_pillar_insights: evaluation.cross_pillar_insights.clone(),
                tech_debt_score: evaluation.tech_debt_score,
            },
            charts: Charts {
                pillar_radar: outcomes
                    .iter()
                    .map(|o| RadarPoint {
                        pillar: self.localizer.pillar_name(language, o.pillar).to_string(),
                        score: o.score,
                    })
                    .collect(),
                level_progress: level_progress(outcomes),
            },
            improvement_roadmap: roadmap,
        }
    }

    fn headline(&self, language: Language, level: Option<Level>) -> String {
        let name = self.localizer.level_name(language, level);
        match (language, level) {
            (Language::En, Some(level)) => format!("Your repository achieved {} {}", level, name),
            (Language::Zh, Some(level)) => format!("您的仓库已达到 {} {}", level, name),
            (Language::En, None) => format!(
                "Your repository has not yet reached L1 {}",
                self.localizer.level_name(language, Some(Level::L1))
            ),
            (Language::Zh, None) => format!(
                "您的仓库尚未达到 L1 {}",
                self.localizer.level_name(language, Some(Level::L1))
            ),
        }
    }

    fn ranked(&self, language: Language, pillars: &[PillarSummary]) -> Vec<String> {
        pillars
            .iter()
            .map(|p| {
                format!(
                    "{} {}: {}%",
                    p.icon,
                    self.localizer.pillar_name(language, p.pillar),
                    p.score
                )
            })
            .collect()
    }

    fn pillar_detail(&self, outcome: &PillarOutcome) -> PillarDetail {
        PillarDetail {
            pillar: outcome.pillar,
            name: self
                .localizer
                .pillar_name(Language::En, outcome.pillar)
                .to_string(),
            name_zh: self
                .localizer
                .pillar_name(Language::Zh, outcome.pillar)
                .to_string(),
            icon: outcome.icon.clone(),
            level_achieved: outcome.level_achieved,
            score: outcome.score,
            checks_passed: outcome.checks_passed,
            checks_total: outcome.checks_total,
            checks: outcome.checks.clone(),
            insights: outcome.insights.clone(),
            recommendations: outcome.recommendations.clone(),
        }
    }
}

fn action_item(fact: &CheckResult) -> ActionItem {
    let suggestion = fact.first_suggestion();
    ActionItem {
        priority: Priority::classify(fact.required, fact.level),
        pillar: fact.pillar,
        level: fact.level,
        check_id: fact.check_id.clone(),
        action_zh: suggestion
            .map(str::to_string)
            .unwrap_or_else(|| format!("修复: {}", fact.check_name)),
        action_en: suggestion
            .map(str::to_string)
            .unwrap_or_else(|| format!("Fix: {}", fact.check_name)),
        template: fact
            .details
            .as_ref()
            .and_then(|d| d.get("template"))
            .and_then(|t| t.as_str())
            .map(str::to_string),
    }
}

/// One action per failed fact, bucketed by priority
pub fn build_roadmap(outcomes: &[PillarOutcome]) -> ImprovementRoadmap {
    let mut items: Vec<ActionItem> = outcomes
        .iter()
        .flat_map(|o| o.checks.iter())
        .filter(|f| !f.passed)
        .map(action_item)
        .collect();
    // Stable: within a priority, pillar and rubric order are kept
    items.sort_by_key(|item| item.priority);

    let bucket = |accept: &dyn Fn(Priority) -> bool, limit: usize| -> Vec<ActionItem> {
        items
            .iter()
            .filter(|item| accept(item.priority))
            .take(limit)
            .cloned()
            .collect()
    };

    ImprovementRoadmap {
        quick_wins: bucket(
            &|p| matches!(p, Priority::Critical | Priority::High),
            QUICK_WIN_LIMIT,
        ),
        short_term: bucket(&|p| p == Priority::Medium, SHORT_TERM_LIMIT),
        medium_term: bucket(&|p| p == Priority::Low, MEDIUM_TERM_LIMIT),
        long_term: Vec::new(),
    }
}

/// Pass rate of every fact at each level, across pillars
pub fn level_progress(outcomes: &[PillarOutcome]) -> Vec<LevelProgress> {
    Level::ALL
        .iter()
        .map(|&level| {
            let (passed, total) = outcomes
                .iter()
                .flat_map(|o| o.checks.iter())
                .filter(|f| f.level == level)
                .fold((0usize, 0usize), |(p, t), f| {
                    (p + usize::from(f.passed), t + 1)
                });
            let score = percent(passed, total);
            LevelProgress {
                level,
                achieved: score >= LEVEL_PROGRESS_THRESHOLD,
                score,
            }
        })
        .collect()
}

fn next_steps(
    language: Language,
    level: Option<Level>,
    roadmap: &ImprovementRoadmap,
) -> Vec<String> {
    let fixed: &[&str] = match (level, language) {
        (None, Language::En) => &[
            "1. Add a README.md file",
            "2. Create package.json or other package manifest",
        ],
        (None, Language::Zh) => &[
            "1. 添加 README.md 文件",
            "2. 创建 package.json 或其他包管理文件",
        ],
        (Some(Level::L1), Language::En) => &[
            "1. Add CONTRIBUTING.md guide",
            "2. Configure code formatter",
        ],
        (Some(Level::L1), Language::Zh) => &[
            "1. 添加 CONTRIBUTING.md 贡献指南",
            "2. 配置代码格式化工具",
        ],
        (Some(Level::L2), Language::En) => &["1. Add CI/CD workflow", "2. Create AGENTS.md file"],
        (Some(Level::L2), Language::Zh) => &["1. 添加 CI/CD 工作流", "2. 创建 AGENTS.md 文件"],
        (Some(Level::L3 | Level::L4), _) => {
            return roadmap
                .iter()
                .take(ROADMAP_NEXT_STEPS)
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item.action(language)))
                .collect();
        }
        (Some(Level::L5), _) => &[],
    };
    fixed.iter().map(|s| s.to_string()).collect()
}

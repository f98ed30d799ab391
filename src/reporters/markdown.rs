//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - CI job summaries
//! - Repository wikis

use super::{level_label, RenderOptions};
use crate::i18n::{Label, Language, Localizer};
use crate::report::{ActionItem, Priority, Report};
use anyhow::Result;

/// Render report as GitHub-flavored Markdown
pub fn render(
    localizer: &dyn Localizer,
    report: &Report,
    options: RenderOptions,
) -> Result<String> {
    let lang = report.meta.language;
    let mut md = String::new();

    md.push_str(&render_header(localizer, report));
    md.push('\n');

    md.push_str(&render_toc(localizer, lang));
    md.push('\n');

    md.push_str(&render_summary(localizer, report));
    md.push('\n');

    md.push_str(&render_details(localizer, report, options));
    md.push('\n');

    md.push_str(&render_roadmap(localizer, report));
    md.push('\n');

    md.push_str(&render_footer(report));

    Ok(md)
}

fn render_header(localizer: &dyn Localizer, report: &Report) -> String {
    let lang = report.meta.language;
    let summary = &report.executive_summary;
    format!(
        "# Agent Ready {}: {}\n\n**Level: {} {}** | **Score: {}/100**\n\nGenerated: {} | Commit: `{}`\n",
        localizer.label(lang, Label::Title),
        report.meta.repo,
        level_label(summary.level),
        localizer.level_name(lang, summary.level),
        summary.score,
        report.meta.timestamp,
        report.meta.commit
    )
}

fn render_toc(localizer: &dyn Localizer, lang: Language) -> String {
    let mut md = String::from("## Table of Contents\n\n");
    for label in [Label::Summary, Label::Details, Label::Roadmap] {
        let title = localizer.label(lang, label);
        md.push_str(&format!("- [{}](#{})\n", title, anchor(title)));
    }
    md
}

fn render_summary(localizer: &dyn Localizer, report: &Report) -> String {
    let lang = report.meta.language;
    let summary = &report.executive_summary;
    let headline = match lang {
        Language::En => &summary.headline_en,
        Language::Zh => &summary.headline_zh,
    };

    let mut md = format!(
        "## {}\n\n{}\n\n| Metric | Value |\n|--------|-------|\n| **Level** | {} |\n| **Score** | {}/100 |\n| **{}** | {} |\n| **Progress to next level** | {:.0}% |\n",
        localizer.label(lang, Label::Summary),
        headline,
        level_label(summary.level),
        summary.score,
        localizer.label(lang, Label::TechDebt),
        report.detailed_analysis.tech_debt_score,
        summary.progress_to_next * 100.0
    );

    for (label, items) in [
        (Label::Strengths, &summary.key_strengths),
        (Label::Weaknesses, &summary.critical_gaps),
    ] {
        if items.is_empty() {
            continue;
        }
        md.push_str(&format!("\n### {}\n\n", localizer.label(lang, label)));
        for item in items {
            md.push_str(&format!("- {}\n", item));
        }
    }

    if !summary.next_steps.is_empty() {
        md.push_str("\n### Next Steps\n\n");
        for step in &summary.next_steps {
            md.push_str(&format!("{}\n", step));
        }
    }
    md
}

fn render_details(localizer: &dyn Localizer, report: &Report, options: RenderOptions) -> String {
    let lang = report.meta.language;
    let mut md = format!(
        "## {}\n\n| Pillar | Level | Score | Checks |\n|--------|-------|-------|--------|\n",
        localizer.label(lang, Label::Details)
    );

    for pillar in &report.detailed_analysis.pillars {
        md.push_str(&format!(
            "| {} {} | {} | {} | {}/{} |\n",
            pillar.icon,
            localizer.pillar_name(lang, pillar.pillar),
            level_label(pillar.level_achieved),
            score_indicator(pillar.score),
            pillar.checks_passed,
            pillar.checks_total
        ));
    }

    if options.verbose {
        for pillar in &report.detailed_analysis.pillars {
            md.push_str(&format!(
                "\n### {} {}\n\n",
                pillar.icon,
                localizer.pillar_name(lang, pillar.pillar)
            ));
            for check in &pillar.checks {
                let mark = if check.passed { "x" } else { " " };
                md.push_str(&format!(
                    "- [{}] **{}** `{}` ({})\n",
                    mark, check.level, check.check_id, check.check_name
                ));
            }
            for insight in &pillar.insights {
                md.push_str(&format!("\n> {}\n", insight));
            }
        }
    }

    let insights = &report.detailed_analysis.cross_pillar_insights;
    if !insights.is_empty() {
        md.push_str("\n### Cross-Pillar Insights\n\n");
        for insight in insights {
            let (text, rec) = match lang {
                Language::En => (&insight.insight_en, &insight.recommendation_en),
                Language::Zh => (&insight.insight_zh, &insight.recommendation_zh),
            };
            md.push_str(&format!("- **{}**: {} {}\n", insight.kind, text, rec));
        }
    }
    md
}

fn render_roadmap(localizer: &dyn Localizer, report: &Report) -> String {
    let lang = report.meta.language;
    let roadmap = &report.improvement_roadmap;
    let mut md = format!("## {}\n\n", localizer.label(lang, Label::Roadmap));

    if roadmap.is_empty() {
        md.push_str("✅ Every check passes.\n");
        return md;
    }

    for (label, items) in [
        (Label::QuickWins, &roadmap.quick_wins),
        (Label::ShortTerm, &roadmap.short_term),
        (Label::MediumTerm, &roadmap.medium_term),
        (Label::LongTerm, &roadmap.long_term),
    ] {
        if items.is_empty() {
            continue;
        }
        md.push_str(&format!("### {}\n\n", localizer.label(lang, label)));
        for item in items {
            md.push_str(&render_action(lang, item));
        }
        md.push('\n');
    }
    md
}

fn render_action(lang: Language, item: &ActionItem) -> String {
    let mut md = format!(
        "- {} **{}** {} (`{}`, {})\n",
        priority_emoji(item),
        item.priority,
        item.action(lang),
        item.check_id,
        item.level
    );
    if let Some(template) = &item.template {
        md.push_str(&format!("  - Template: `{}`\n", template));
    }
    md
}

fn render_footer(report: &Report) -> String {
    format!(
        "---\n\n*Profile `{}` v{}, {} pillars evaluated in {}ms*\n",
        report.meta.profile,
        report.meta.profile_version,
        report.meta.agents_used,
        report.meta.scan_duration_ms
    )
}

fn priority_emoji(item: &ActionItem) -> &'static str {
    match item.priority {
        Priority::Critical => "🔴",
        Priority::High => "🟠",
        Priority::Medium => "🟡",
        Priority::Low => "🔵",
    }
}

fn score_indicator(score: u8) -> String {
    let badge = if score >= 80 {
        "🟢"
    } else if score >= 60 {
        "🟡"
    } else {
        "🔴"
    };
    format!("{} {}%", badge, score)
}

/// GitHub heading anchor: lowercase, spaces to dashes, punctuation dropped
fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

//! Text (terminal) reporter with colors and formatting

use super::{level_label, RenderOptions};
use crate::i18n::{Label, Language, Localizer};
use crate::models::{CheckResult, Level};
use crate::report::{ActionItem, PillarDetail, Priority, Report};
use anyhow::Result;
use console::style;

/// Roadmap items shown per bucket before truncating
const MAX_ITEMS_PER_BUCKET: usize = 5;

/// Render report as formatted terminal output
pub fn render(
    localizer: &dyn Localizer,
    report: &Report,
    options: RenderOptions,
) -> Result<String> {
    let lang = report.meta.language;
    let summary = &report.executive_summary;
    let mut out = String::new();

    // Header
    out.push_str(&format!(
        "\n{}\n",
        style(format!("Agent Ready {}", localizer.label(lang, Label::Title))).bold()
    ));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));
    out.push_str(&format!(
        "{} @ {}  {} v{}  {}ms\n",
        style(&report.meta.repo).bold(),
        short_commit(&report.meta.commit),
        report.meta.profile,
        report.meta.profile_version,
        report.meta.scan_duration_ms
    ));
    out.push_str(&format!(
        "Level: {} {}  Score: {}  {}: {}\n",
        style(level_label(summary.level)).bold(),
        localizer.level_name(lang, summary.level),
        format_score(summary.score),
        localizer.label(lang, Label::TechDebt),
        report.detailed_analysis.tech_debt_score
    ));
    if let Some(next) = next_level(summary.level) {
        out.push_str(&format!(
            "{}\n",
            style(format!(
                "{}% of {} checks passing",
                (summary.progress_to_next * 100.0).round(),
                next
            ))
            .dim()
        ));
    }
    let headline = match lang {
        Language::En => &summary.headline_en,
        Language::Zh => &summary.headline_zh,
    };
    out.push_str(&format!("{}\n\n", headline));

    // Pillars (compact)
    out.push_str(&format!(
        "{}\n",
        style(localizer.label(lang, Label::Details).to_uppercase()).bold()
    ));
    for pillar in &report.detailed_analysis.pillars {
        out.push_str(&render_pillar_line(localizer, lang, pillar));
        if options.verbose {
            for check in &pillar.checks {
                out.push_str(&render_check_line(check));
            }
        }
    }
    out.push('\n');

    if !summary.key_strengths.is_empty() {
        out.push_str(&format!(
            "{}\n",
            style(localizer.label(lang, Label::Strengths)).bold()
        ));
        for s in &summary.key_strengths {
            out.push_str(&format!("  {}\n", style(s).green()));
        }
        out.push('\n');
    }
    if !summary.critical_gaps.is_empty() {
        out.push_str(&format!(
            "{}\n",
            style(localizer.label(lang, Label::Weaknesses)).bold()
        ));
        for s in &summary.critical_gaps {
            out.push_str(&format!("  {}\n", style(s).red()));
        }
        out.push('\n');
    }

    for insight in &report.detailed_analysis.cross_pillar_insights {
        let (text, rec) = match lang {
            Language::En => (&insight.insight_en, &insight.recommendation_en),
            Language::Zh => (&insight.insight_zh, &insight.recommendation_zh),
        };
        out.push_str(&format!("  [{}] {}\n", insight.kind, text));
        out.push_str(&format!("  {}\n", style(format!("→ {}", rec)).dim()));
    }
    if !report.detailed_analysis.cross_pillar_insights.is_empty() {
        out.push('\n');
    }

    // Roadmap
    let roadmap = &report.improvement_roadmap;
    if !roadmap.is_empty() {
        out.push_str(&format!(
            "{}\n",
            style(localizer.label(lang, Label::Roadmap).to_uppercase()).bold()
        ));
        for (label, items) in [
            (Label::QuickWins, &roadmap.quick_wins),
            (Label::ShortTerm, &roadmap.short_term),
            (Label::MediumTerm, &roadmap.medium_term),
            (Label::LongTerm, &roadmap.long_term),
        ] {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("  {}\n", localizer.label(lang, label)));
            for item in items.iter().take(MAX_ITEMS_PER_BUCKET) {
                out.push_str(&render_action_line(lang, item));
            }
        }
        out.push('\n');
    }

    for step in &summary.next_steps {
        out.push_str(&format!("{}\n", style(step).dim()));
    }

    Ok(out)
}

fn render_pillar_line(localizer: &dyn Localizer, lang: Language, pillar: &PillarDetail) -> String {
    format!(
        "  {} {:<28} {:>2}  {}  ({}/{})\n",
        pillar.icon,
        localizer.pillar_name(lang, pillar.pillar),
        level_label(pillar.level_achieved),
        format_score(pillar.score),
        pillar.checks_passed,
        pillar.checks_total
    )
}

fn render_check_line(check: &CheckResult) -> String {
    let mark = if check.passed {
        style("✓").green()
    } else {
        style("✗").red()
    };
    let mut line = format!(
        "      {} {} {}",
        mark,
        style(check.level).dim(),
        check.check_name
    );
    if let Some(error) = check.error() {
        line.push_str(&format!("  {}", style(error).yellow()));
    } else if let Some(files) = check.matched_files.as_ref().filter(|f| !f.is_empty()) {
        line.push_str(&format!("  {}", style(files.join(", ")).dim()));
    }
    line.push('\n');
    line
}

fn render_action_line(lang: Language, item: &ActionItem) -> String {
    let tag = match item.priority {
        Priority::Critical => style("[C]").red().bold(),
        Priority::High => style("[H]").red(),
        Priority::Medium => style("[M]").yellow(),
        Priority::Low => style("[L]").blue(),
    };
    format!(
        "    {} {} {}\n",
        tag,
        item.action(lang),
        style(&item.check_id).dim()
    )
}

fn next_level(current: Option<Level>) -> Option<Level> {
    match current {
        None => Some(Level::L1),
        Some(level) => level.next(),
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}

fn format_score(score: u8) -> String {
    let s = style(format!("{}%", score));
    let s = if score >= 80 {
        s.green()
    } else if score >= 60 {
        s.yellow()
    } else {
        s.red()
    };
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::BuiltinLocalizer;
    use crate::reporters::tests::test_report;

    fn plain(report: &Report, verbose: bool) -> String {
        let out = render(&BuiltinLocalizer, report, RenderOptions { verbose }).unwrap();
        console::strip_ansi_codes(&out).into_owned()
    }

    #[test]
    fn test_text_render_summary() {
        let out = plain(&test_report(Language::En), false);
        assert!(out.contains("Agent Ready Scan Report"));
        assert!(out.contains("widgets @ 01234567"));
        assert!(out.contains("Level: - Not Achieved"));
        assert!(out.contains("50% of L1 checks passing"));
        assert!(out.contains("Documentation"));
        assert!(out.contains("Quick Wins"));
        assert!(out.contains("[C]"));
        // Check lines only in verbose mode
        assert!(!out.contains("readme name"));
    }

    #[test]
    fn test_text_render_verbose_lists_checks() {
        let out = plain(&test_report(Language::En), true);
        assert!(out.contains("✓ L1 readme name  README.md"));
        assert!(out.contains("✗ L2 docs_contributing name"));
    }

    #[test]
    fn test_text_render_chinese_labels() {
        let out = plain(&test_report(Language::Zh), false);
        assert!(out.contains("扫描报告"));
        assert!(out.contains("未达标"));
        assert!(out.contains("改进路线图"));
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("unknown"), "unknown");
        assert_eq!(short_commit("0123456789abcdef"), "01234567");
    }
}

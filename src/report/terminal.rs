use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::config::DisplayConfig;
use crate::models::{AnalysisResult, NetworkGraph, RiskItem, RiskLevel, TextMetrics};
use crate::normalize::classifier::{classify, ColorTag};

const GAUGE_WIDTH: usize = 30;
/// Visible width of a summary box row between `│  ` and ` │`.
const BOX_WIDTH: usize = 48;

/// Render a colored terminal report.
pub fn render(
    result: &AnalysisResult,
    display: &DisplayConfig,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let score = result.overall_risk_score();
    let level = result.overall_risk_level();
    let tag = classify(score).color;

    if quiet {
        println!(
            "Overall: {}  Level: {}  Risks: {}  Entities: {}",
            format!("{:.1}", score).color(term_color(tag)),
            level.to_string().color(term_color(tag)),
            result.risk_items.len(),
            result.entities.total(),
        );
        return Ok(());
    }

    let limits = if verbose {
        DisplayConfig {
            max_instances: usize::MAX,
            max_entities: usize::MAX,
            max_links: usize::MAX,
        }
    } else {
        display.clone()
    };

    println!("\n {} v{}", "risk-radar".bold(), env!("CARGO_PKG_VERSION"));
    if let Some(source) = &result.source {
        match &source.title {
            Some(title) => println!(" Source: {} ({})", title, source.url),
            None => println!(" Source: {}", source.url),
        }
    }
    println!();

    for line in summary_box(score, level, tag, &result.text_metrics) {
        println!(" {}", line);
    }

    if let Some(recommendation) = &result.recommendation {
        println!(" {} {}", "→".cyan(), recommendation);
    }
    println!();

    if !result.category_scores.is_empty() {
        println!(" {} Category scores:\n", "[SCORES]".bold());
        render_category_table(result);
        println!();
    }

    if result.risk_items.is_empty() {
        println!(" {} No risks detected.\n", "✓".green());
    } else {
        println!(
            " {} {} risk(s) detected:\n",
            "[RISKS]".red().bold(),
            result.risk_items.len()
        );
        for item in &result.risk_items {
            render_risk_item(item, limits.max_instances);
        }
    }

    if !result.entities.is_empty() {
        println!(" {} Extracted entities:\n", "[ENTITIES]".cyan().bold());
        render_entity_table(result, limits.max_entities);
        println!();
    }

    if let Some(network) = &result.network {
        render_network(network, limits.max_links);
    }

    if verbose {
        if let Some(preview) = &result.content_preview {
            println!(" {} Content preview:\n", "[PREVIEW]".dimmed().bold());
            println!("   {}\n", preview.dimmed());
        }
    }

    Ok(())
}

/// Bordered overall-risk summary; every line has the same visible width.
fn summary_box(score: f64, level: RiskLevel, tag: ColorTag, metrics: &TextMetrics) -> Vec<String> {
    let border = "─".repeat(BOX_WIDTH + 3);
    vec![
        format!("┌{}┐", border),
        format!("│  {:<48} │", "OVERALL RISK".bold()),
        // 30 + 1 + 5 + 1 + 11 = BOX_WIDTH
        format!(
            "│  {} {:>5.1} {:<11} │",
            gauge(score, GAUGE_WIDTH).color(term_color(tag)),
            score,
            level.to_string().color(term_color(tag)).bold()
        ),
        format!(
            "│  {:<48} │",
            format!(
                "Words: {}  Sentences: {}  Risk keywords: {}",
                metrics.word_count, metrics.sentence_count, metrics.risk_keyword_total
            )
        ),
        format!("└{}┘", border),
    ]
}

fn render_category_table(result: &AnalysisResult) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Level").add_attribute(Attribute::Bold),
        ]);

    let mut rows: Vec<(&String, &f64)> = result.category_scores.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    for (name, score) in rows {
        let classification = classify(*score);
        table.add_row(vec![
            Cell::new(display_label(name)),
            Cell::new(format!("{:.1}", score)).set_alignment(CellAlignment::Right),
            Cell::new(classification.level.to_string()).fg(table_color(classification.color)),
        ]);
    }

    println!("{}", table);
}

fn render_risk_item(item: &RiskItem, max_instances: usize) {
    let label = display_label(&item.label);
    match item.score {
        Some(score) => {
            let tag = classify(score).color;
            println!(
                "  {} {}  {}",
                "●".color(term_color(tag)),
                label.bold(),
                format!("{:.1}", score).color(term_color(tag))
            );
        }
        None => println!("  {} {}", "●".dimmed(), label.bold()),
    }

    if let Some(description) = &item.description {
        println!("    {}", description.dimmed());
    }
    if !item.keywords_found.is_empty() {
        println!("    Keywords: {}", item.keywords_found.join(", "));
    }
    if item.instance_count > 0 {
        println!("    Instances: {}", item.instance_count);
    }

    for instance in item.instances.iter().take(max_instances) {
        println!("    {} \"{}\"", "›".cyan(), instance.sentence.trim());
        if !instance.financial_impact.is_empty() {
            println!("      Impact: {}", instance.financial_impact.join(", "));
        }
    }
    if item.instances.len() > max_instances {
        println!(
            "    {}",
            format!("… {} more", item.instances.len() - max_instances).dimmed()
        );
    }
    println!();
}

fn render_entity_table(result: &AnalysisResult, max_entities: usize) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
            Cell::new("Values").add_attribute(Attribute::Bold),
        ]);

    for (title, values) in result.entities.lists() {
        if values.is_empty() {
            continue;
        }
        table.add_row(vec![
            Cell::new(title),
            Cell::new(values.len()).set_alignment(CellAlignment::Right),
            Cell::new(truncate_list(values, max_entities)),
        ]);
    }

    println!("{}", table);
}

fn render_network(network: &NetworkGraph, max_links: usize) {
    println!(
        " {} {} node(s), {} link(s)",
        "[NETWORK]".magenta().bold(),
        network.nodes.len(),
        network.links.len()
    );

    for link in network.links.iter().take(max_links) {
        match &link.relationship {
            Some(relationship) => println!(
                "   {} {} {} {}",
                link.source,
                "─".dimmed(),
                relationship.dimmed(),
                format!("→ {}", link.target)
            ),
            None => println!("   {} → {}", link.source, link.target),
        }
    }
    if network.links.len() > max_links {
        println!(
            "   {}",
            format!("… {} more", network.links.len() - max_links).dimmed()
        );
    }
    println!();
}

/// `credit_risk` → `Credit Risk`.
fn display_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A bar of `width` cells, filled in proportion to `score` out of 100.
fn gauge(score: f64, width: usize) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn truncate_list(values: &[String], max: usize) -> String {
    if values.len() <= max {
        return values.join(", ");
    }
    format!(
        "{}, … (+{})",
        values[..max].join(", "),
        values.len() - max
    )
}

fn term_color(tag: ColorTag) -> colored::Color {
    match tag {
        ColorTag::Green => colored::Color::Green,
        ColorTag::Orange => colored::Color::Yellow,
        ColorTag::Red => colored::Color::Red,
    }
}

fn table_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Green => Color::Green,
        ColorTag::Orange => Color::Yellow,
        ColorTag::Red => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("credit_risk"), "Credit Risk");
        assert_eq!(display_label("Liquidity risk"), "Liquidity Risk");
        assert_eq!(display_label("_esg__risk_"), "Esg Risk");
    }

    #[test]
    fn test_gauge() {
        assert_eq!(gauge(0.0, 10), "░".repeat(10));
        assert_eq!(gauge(50.0, 10), format!("{}{}", "█".repeat(5), "░".repeat(5)));
        assert_eq!(gauge(150.0, 10), "█".repeat(10));
    }

    #[test]
    fn test_summary_box_rows_align() {
        colored::control::set_override(false);
        let metrics = TextMetrics {
            word_count: 250,
            sentence_count: 12,
            risk_keyword_total: 4,
        };

        for score in [0.0, 45.5, 100.0] {
            let classification = classify(score);
            let lines = summary_box(score, classification.level, classification.color, &metrics);
            let widths: Vec<usize> = lines.iter().map(|line| line.chars().count()).collect();
            assert!(
                widths.iter().all(|w| *w == BOX_WIDTH + 5),
                "misaligned box for {}: {:?}",
                score,
                widths
            );
        }
        colored::control::unset_override();
    }

    #[test]
    fn test_truncate_list() {
        let values: Vec<String> = ["SEC", "FDIC", "OCC"].iter().map(|s| s.to_string()).collect();
        assert_eq!(truncate_list(&values, 5), "SEC, FDIC, OCC");
        assert_eq!(truncate_list(&values, 2), "SEC, FDIC, … (+1)");
    }

    #[test]
    fn test_term_colors_follow_classification() {
        assert_eq!(term_color(classify(10.0).color), colored::Color::Green);
        assert_eq!(term_color(classify(75.0).color), colored::Color::Red);
        assert_eq!(table_color(classify(45.0).color), Color::Yellow);
    }
}

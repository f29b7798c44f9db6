//! Terminal presentation of aggregated news.
//!
//! Everything writes to an `io::Write` so the CLI can target stdout while
//! tests capture into a buffer.

use crate::diagnostics::TracingSink;
use crate::traits::{Diagnostic, DiagnosticSink};
use crate::types::{AggregationReport, NewsItem, Result};
use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use prettytable::{format, Cell, Row, Table};
use std::io::Write;

pub const MAX_TITLE_CHARS: usize = 70;
const SHORT_TITLE_CHARS: usize = 67;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStyle {
    pub icon: &'static str,
    pub color: Color,
}

/// Icon and color picked from keywords in the source name.
pub fn source_style(source: &str) -> SourceStyle {
    let lower = source.to_lowercase();

    if source.contains("経済") || lower.contains("business") {
        SourceStyle { icon: "💼", color: Color::Yellow }
    } else if lower.contains("yahoo") {
        SourceStyle { icon: "📰", color: Color::Red }
    } else if lower.contains("itmedia") || source.contains("IT") {
        SourceStyle { icon: "💻", color: Color::Green }
    } else {
        SourceStyle { icon: "📄", color: Color::Blue }
    }
}

pub fn shorten_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut short: String = title.chars().take(SHORT_TITLE_CHARS).collect();
    short.push_str("...");
    short
}

/// Groups items by source, keeping the order in which sources first appear.
pub fn group_by_source(items: &[NewsItem]) -> Vec<(&str, Vec<&NewsItem>)> {
    let mut groups: Vec<(&str, Vec<&NewsItem>)> = Vec::new();

    for item in items {
        match groups.iter_mut().find(|(source, _)| *source == item.source()) {
            Some((_, group)) => group.push(item),
            None => groups.push((item.source(), vec![item])),
        }
    }
    groups
}

pub fn render_welcome(out: &mut dyn Write) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📰 News Aggregator 📰".bold().bright_blue())?;
    writeln!(out, "{}", "Fetching the latest headlines from several sources".white())?;
    writeln!(out)?;
    Ok(())
}

/// One table per source with a time column and numbered titles.
pub fn render_news(out: &mut dyn Write, items: &[NewsItem]) -> Result<()> {
    for (source, group) in group_by_source(items) {
        let style = source_style(source);
        let heading = format!("{} {} ({} items)", style.icon, source, group.len());

        writeln!(out)?;
        writeln!(out, "{}", heading.color(style.color).bold())?;

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(Row::new(vec![Cell::new("Time").style_spec("b"), Cell::new("Title").style_spec("b")]));

        for (index, item) in group.iter().enumerate() {
            table.add_row(Row::new(vec![
                Cell::new(item.published().unwrap_or("")).style_spec("Fc"),
                Cell::new(&format!("{:2}. {}", index + 1, shorten_title(item.title()))),
            ]));
        }

        table.print(&mut *out)?;
    }
    Ok(())
}

/// Item counts per source plus a total. Failed sources are listed with zero.
pub fn render_summary(out: &mut dyn Write, report: &AggregationReport) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Source").style_spec("bFy"),
        Cell::new("Items").style_spec("bcFg"),
    ]));

    for source in &report.sources {
        let count = source.outcome.items().len();
        let label = if source.outcome.is_failed() {
            format!("{} (failed)", source.name)
        } else {
            source.name.clone()
        };
        table.add_row(Row::new(vec![Cell::new(&label), Cell::new(&count.to_string()).style_spec("c")]));
    }

    table.add_row(Row::new(vec![
        Cell::new("Total").style_spec("b"),
        Cell::new(&report.item_count().to_string()).style_spec("bc"),
    ]));

    writeln!(out)?;
    writeln!(out, "{}", "📊 Summary".bold().cyan())?;
    table.print(&mut *out)?;
    Ok(())
}

pub fn render_footer(out: &mut dyn Write, now: DateTime<Local>) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", "🕐 Last updated:".dimmed(), now.format("%Y-%m-%d %H:%M:%S").to_string().bold())?;
    writeln!(out, "{}", "💡 Headlines are fetched automatically from each site.".dimmed())?;
    writeln!(out, "{}", "🔗 Follow the article links for the full stories.".dimmed())?;
    writeln!(out)?;
    Ok(())
}

pub fn render_empty(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "❌ No news could be retrieved.".bold().red())?;
    writeln!(out, "{}", "💡 Check your internet connection.".yellow())?;
    Ok(())
}

pub fn render_json(out: &mut dyn Write, items: &[NewsItem]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, items)?;
    writeln!(out)?;
    Ok(())
}

/// Prints diagnostics to stderr in color and forwards them to tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn report(&self, diagnostic: Diagnostic) {
        let message = diagnostic.to_string();
        if diagnostic.is_failure() {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{}", message.yellow());
        }
        TracingSink.report(diagnostic);
    }

    fn progress(&self, source: &str, position: usize, total: usize) {
        eprintln!("{}", format!("📡 Fetching RSS feeds... {} ({}/{})", source, position, total).dimmed());
        TracingSink.progress(source, position, total);
    }
}

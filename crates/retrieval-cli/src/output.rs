//! Table/colored-text rendering, in the teacher's `comfy-table` + `colored`
//! idiom.

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use retrieval_observability::HealthReport;
use retrieval_search::InferenceChunk;

pub fn display_search_results(results: &[InferenceChunk]) {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Score", "Document", "Snippet", "Source"]);

    for chunk in results {
        let score_cell = Cell::new(format!("{:.3}", chunk.score)).fg(score_color(chunk.score));
        let snippet: String = chunk.blurb.chars().take(80).collect();
        let snippet = if snippet.len() < chunk.blurb.len() {
            format!("{snippet}...")
        } else {
            snippet
        };
        table.add_row(vec![
            score_cell,
            Cell::new(&chunk.semantic_identifier),
            Cell::new(snippet),
            Cell::new(&chunk.source_type),
        ]);
    }

    println!("{table}");
}

fn score_color(score: f64) -> Color {
    if score >= 0.8 {
        Color::Green
    } else if score >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn display_health(report: &HealthReport) {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Component", "Status", "Message"]);

    for component in &report.components {
        let status_cell = match component.status {
            retrieval_observability::HealthStatus::Healthy => {
                Cell::new(component.status.to_string()).fg(Color::Green)
            }
            retrieval_observability::HealthStatus::Degraded => {
                Cell::new(component.status.to_string()).fg(Color::Yellow)
            }
            retrieval_observability::HealthStatus::Unhealthy => {
                Cell::new(component.status.to_string()).fg(Color::Red)
            }
        };
        table.add_row(vec![
            Cell::new(&component.name),
            status_cell,
            Cell::new(&component.message),
        ]);
    }

    println!("{table}");
    println!(
        "{} version {} up {:.0}s",
        "overall:".bold(),
        report.version,
        report.uptime_seconds
    );
}

pub fn display_success(message: &str) {
    println!("{} {message}", "OK:".green().bold());
}

pub fn display_warning(message: &str) {
    println!("{} {message}", "warning:".yellow().bold());
}

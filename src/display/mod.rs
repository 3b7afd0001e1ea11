//! Terminal rendering of a listing: the item table, the stats line and the
//! page footer.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::domains::format_count;
use crate::listing::{ListingDomain, ListingEngine, ListingItem, ListingPhase, ListingStats};

/// Marker column shown in interactive mode for selected rows
const SELECTED_MARK: &str = "●";

pub fn format_status_colored(status: &str) -> String {
    let badge = format!("[{status}]");
    match status {
        "published" => badge.green().to_string(),
        "draft" => badge.yellow().to_string(),
        "scheduled" => badge.cyan().to_string(),
        "closed" | "archived" => badge.dimmed().to_string(),
        _ => badge,
    }
}

/// Items on the current page as a table, foreign ids rendered by name
pub fn render_table<D: ListingDomain>(engine: &ListingEngine<D>, show_selection: bool) -> String {
    let domain = engine.domain();
    let name = |kind, id: &str| engine.display_name(kind, id).to_string();

    let mut builder = Builder::default();
    let mut header: Vec<String> = Vec::new();
    if show_selection {
        header.push(String::new());
    }
    header.extend(domain.headers().iter().map(|h| h.to_string()));
    builder.push_record(header);

    for item in engine.items() {
        let mut row = Vec::new();
        if show_selection {
            let mark = if engine.selection().contains(item.id()) {
                SELECTED_MARK
            } else {
                ""
            };
            row.push(mark.to_string());
        }
        row.extend(domain.row(item, &name));
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// One-line summary of the stats block
pub fn format_stats(stats: &ListingStats) -> String {
    let mut parts = vec![format!("{} total", format_count(stats.total))];
    parts.extend(
        stats
            .by_status
            .iter()
            .map(|(status, n)| format!("{status} {}", format_count(*n))),
    );
    parts.push(format!("{} views", format_count(stats.views)));
    parts.push(format!("{} engagement", format_count(stats.engagement)));

    let mut line = parts.join(" · ");
    if stats.source.is_approximate() {
        line.push_str(&format!(" {}", "(approximate: current page only)".dimmed()));
    }
    line
}

pub fn format_page_footer<D: ListingDomain>(engine: &ListingEngine<D>) -> String {
    let mut footer = format!("Page {}", engine.page_number());
    if engine.can_go_previous() {
        footer.push_str(" · previous available");
    }
    if engine.has_more() {
        footer.push_str(" · more available");
    }
    if !engine.selection().is_empty() {
        footer.push_str(&format!(" · {} selected", engine.selection().len()));
    }
    footer
}

/// Message shown when a fetch failed. The previous page stays visible below it.
pub fn format_error_panel(listing: &str, message: &str) -> String {
    format!(
        "{} {}\n{}",
        format!("Failed to load {listing}:").red().bold(),
        message,
        "Press 'r' to retry.".dimmed()
    )
}

pub fn format_empty_state<D: ListingDomain>(engine: &ListingEngine<D>) -> String {
    let listing = engine.domain().name();
    if engine.criteria().is_unfiltered() {
        format!("No {listing} yet.")
    } else {
        format!("No {listing} match the current filters.")
    }
}

/// Full view of the listing in its current phase
pub fn render_listing<D: ListingDomain>(engine: &ListingEngine<D>, show_selection: bool) -> String {
    let mut out = String::new();

    match engine.phase() {
        ListingPhase::Idle => return out,
        ListingPhase::Loading if engine.items().is_empty() => {
            out.push_str(&format!("Loading {}…", engine.domain().name()));
            return out;
        }
        ListingPhase::Errored => {
            out.push_str(&format_error_panel(
                engine.domain().name(),
                engine.last_error().unwrap_or("unknown error"),
            ));
            out.push_str("\n\n");
        }
        _ => {}
    }

    out.push_str(&format_stats(engine.stats()));
    out.push('\n');
    if engine.items().is_empty() {
        out.push_str(&format_empty_state(engine));
    } else {
        out.push_str(&render_table(engine, show_selection));
    }
    out.push('\n');
    out.push_str(&format_page_footer(engine).cyan().to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Page;
    use crate::domains::{Job, JobsDomain};
    use crate::listing::{EngineOptions, FilterCriteria, StatsSource};
    use crate::types::Cursor;

    fn loaded_engine(items: Vec<Job>, has_more: bool) -> ListingEngine<JobsDomain> {
        let mut engine = ListingEngine::new(JobsDomain, EngineOptions::default());
        let request = engine.start();
        let last_id = items.last().map(|j| Cursor::new(j.id.clone()));
        engine.apply_fetch(
            &request,
            Ok(Page {
                items,
                last_id,
                has_more,
                stats: None,
            }),
        );
        engine
    }

    fn job(id: &str, title: &str) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            status: Some("published".to_string()),
            views: 2500,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_table_contains_headers_and_rows() {
        let engine = loaded_engine(vec![job("job1", "Reporter"), job("job2", "Editor")], false);
        let table = render_table(&engine, false);
        assert!(table.contains("Title"));
        assert!(table.contains("Reporter"));
        assert!(table.contains("Editor"));
        assert!(table.contains("2,500"));
        assert!(!table.contains(SELECTED_MARK));
    }

    #[test]
    fn test_render_table_marks_selection() {
        let mut engine = loaded_engine(vec![job("job1", "Reporter")], false);
        engine.toggle_selection("job1");
        assert!(render_table(&engine, true).contains(SELECTED_MARK));
    }

    #[test]
    fn test_format_stats_marks_page_stats_as_approximate() {
        let mut stats = ListingStats {
            total: 1200,
            views: 10,
            ..Default::default()
        };
        stats.by_status.insert("draft".to_string(), 3);
        let line = format_stats(&stats);
        assert!(line.starts_with("1,200 total · draft 3 · 10 views"));
        assert!(line.contains("approximate"));

        let backend = ListingStats::from_backend(stats);
        assert_eq!(backend.source, StatsSource::Backend);
        assert!(!format_stats(&backend).contains("approximate"));
    }

    #[test]
    fn test_footer_reports_more_results() {
        let engine = loaded_engine(vec![job("job1", "Reporter")], true);
        let footer = format_page_footer(&engine);
        assert!(footer.starts_with("Page 1"));
        assert!(footer.contains("more available"));
        assert!(!footer.contains("previous"));
    }

    #[test]
    fn test_empty_state_depends_on_filters() {
        let engine = loaded_engine(Vec::new(), false);
        assert_eq!(format_empty_state(&engine), "No jobs yet.");

        let mut filtered = ListingEngine::with_filters(
            JobsDomain,
            EngineOptions::default(),
            FilterCriteria::new().with_search_text("editor"),
        );
        let request = filtered.start();
        filtered.apply_fetch(&request, Ok(Page::empty()));
        assert_eq!(
            format_empty_state(&filtered),
            "No jobs match the current filters."
        );
    }

    #[test]
    fn test_render_listing_shows_error_above_previous_items() {
        let mut engine = loaded_engine(vec![job("job1", "Reporter")], true);
        let request = engine.next_page().unwrap();
        engine.apply_fetch(
            &request,
            Err(crate::error::NewsdeskError::Api("boom (500)".to_string())),
        );
        let view = render_listing(&engine, false);
        assert!(view.contains("Failed to load jobs"));
        assert!(view.contains("boom (500)"));
        assert!(view.contains("Reporter"));
    }
}

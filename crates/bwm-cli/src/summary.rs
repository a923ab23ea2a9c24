//! Terminal tables for command output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bwm_core::RunSummary;
use bwm_elements::{CategoryResolution, ComplianceStats, compliance_stats};
use bwm_model::{MatchRun, MatchStrategy, ModelElement, WbsSet};

const SAMPLE_ROWS: usize = 10;

pub fn print_run_summary(summary: &RunSummary, run: &MatchRun) {
    println!("Run: {}", summary.run_id);
    println!("WBS set: {}", summary.wbs_set_id);
    if !summary.latest_pointer_updated {
        eprintln!(
            "warning: run saved but not recorded as the set's latest; \
             re-run `bwm match run` or query the run by id"
        );
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Strategy"),
        header_cell("Elements"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let counts = run.strategy_counts();
    for strategy in [
        MatchStrategy::AssemblyCodeExact,
        MatchStrategy::AssemblyCodePrefix,
        MatchStrategy::DescriptionSimilarity,
        MatchStrategy::Unmatched,
    ] {
        let count = counts.get(&strategy).copied().unwrap_or(0);
        table.add_row(vec![
            strategy_cell(strategy),
            count_cell(count, strategy),
            Cell::new(share(count, summary.total_elements)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total_elements).add_attribute(Attribute::Bold),
        Cell::new("100.0%").add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Matched {} of {} elements, mean confidence {:.4}",
        summary.matched_elements, summary.total_elements, summary.average_confidence
    );
}

pub fn print_run_detail(run: &MatchRun) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Element"),
        header_cell("Assembly Code"),
        header_cell("WBS Code"),
        header_cell("WBS Title"),
        header_cell("Confidence"),
        header_cell("Strategy"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for result in &run.results {
        table.add_row(vec![
            Cell::new(&result.item_key),
            Cell::new(&result.element_id),
            text_cell(&result.assembly_code),
            match &result.matched_wbs_code {
                Some(code) => Cell::new(code).fg(Color::Blue),
                None => dim_cell("-"),
            },
            text_cell(result.matched_wbs_title.as_deref().unwrap_or("")),
            confidence_cell(result.confidence, result.strategy),
            strategy_cell(result.strategy),
        ]);
    }
    println!("{table}");
}

pub fn print_sets(sets: &[WbsSet]) {
    if sets.is_empty() {
        println!("No WBS sets saved.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Set"),
        header_cell("Project"),
        header_cell("Model"),
        header_cell("Source"),
        header_cell("Rows"),
        header_cell("Created"),
        header_cell("Latest Run"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for set in sets {
        table.add_row(vec![
            Cell::new(set.id.as_str()),
            Cell::new(set.project_id.as_str()),
            match &set.model_id {
                Some(model) => Cell::new(model.as_str()),
                None => dim_cell("-"),
            },
            Cell::new(&set.source_name),
            Cell::new(set.row_count()),
            Cell::new(set.created_at.format("%Y-%m-%d %H:%M").to_string()),
            match &set.latest_run_id {
                Some(run) => Cell::new(run.as_str()),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
}

pub fn print_resolution(label: &str, resolution: &CategoryResolution) {
    println!("Category: {label}");
    println!("Resolved token: {}", resolution.resolved_token);
    println!("Filter: {}", resolution.filter_used);
    print_elements(&resolution.rows);
}

pub fn print_elements(elements: &[ModelElement]) {
    let stats = compliance_stats(elements);
    print_compliance(&stats);
    if elements.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Element"),
        header_cell("Category"),
        header_cell("Family"),
        header_cell("Name"),
        header_cell("Assembly Code"),
        header_cell("Filled"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for element in elements.iter().take(SAMPLE_ROWS) {
        table.add_row(vec![
            Cell::new(&element.element_id),
            text_cell(&element.category),
            text_cell(&element.family_name),
            text_cell(&element.element_name),
            text_cell(&element.assembly_code),
            match element.compliance {
                Some(compliance) => Cell::new(format!("{:.1}%", compliance.pct)),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
    if elements.len() > SAMPLE_ROWS {
        println!("... and {} more", elements.len() - SAMPLE_ROWS);
    }
}

fn print_compliance(stats: &ComplianceStats) {
    println!(
        "Elements: {} ({} fully attributed, mean field compliance {:.2}%)",
        stats.elements, stats.fully_filled, stats.mean_pct
    );
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn strategy_cell(strategy: MatchStrategy) -> Cell {
    match strategy {
        MatchStrategy::AssemblyCodeExact => Cell::new(strategy.as_str()).fg(Color::Green),
        MatchStrategy::AssemblyCodePrefix => Cell::new(strategy.as_str()).fg(Color::Blue),
        MatchStrategy::DescriptionSimilarity => Cell::new(strategy.as_str()).fg(Color::Yellow),
        MatchStrategy::Unmatched => dim_cell(strategy.as_str()),
    }
}

fn count_cell(count: usize, strategy: MatchStrategy) -> Cell {
    if count > 0 && strategy == MatchStrategy::Unmatched {
        Cell::new(count).fg(Color::Yellow)
    } else if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
    }
}

fn confidence_cell(confidence: f64, strategy: MatchStrategy) -> Cell {
    if strategy.is_matched() {
        Cell::new(format!("{confidence:.4}"))
    } else {
        dim_cell("-")
    }
}

fn text_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn share(count: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", count as f64 / total as f64 * 100.0)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

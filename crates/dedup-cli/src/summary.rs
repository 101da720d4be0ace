use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dedup_model::ConflictReport;

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    if let Some(state) = &result.state {
        println!("Job: {} ({})", state.job_id, state.status);
        if state.is_dry_run {
            println!("Mode: dry run (no merges applied)");
        }

        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Pages"),
            header_cell("Records"),
            header_cell("Groups"),
            header_cell("Duplicates"),
            header_cell("Merged"),
            header_cell("Conflicts"),
        ]);
        apply_stats_table_style(&mut table);
        for index in 0..6 {
            align_column(&mut table, index, CellAlignment::Right);
        }
        let (pages, groups, conflicts) = match &result.report {
            Some(report) => (
                Cell::new(report.pages),
                Cell::new(report.groups.len()),
                count_cell(report.conflict_count(), Color::Yellow),
            ),
            None => (dim_cell("-"), dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![
            pages,
            Cell::new(state.records_processed),
            groups,
            Cell::new(state.duplicates_found),
            Cell::new(state.records_merged),
            conflicts,
        ]);
        println!("{table}");

        print_groups(result);
        print_audit_notes(result);

        if !state.notes.is_empty() {
            eprintln!("Notes:");
            for note in &state.notes {
                eprintln!("- {}", note.message);
            }
        }
    }
    if let Some(error) = &result.error {
        eprintln!("error: {error}");
    }
}

fn print_groups(result: &RunResult) {
    let Some(report) = &result.report else {
        return;
    };
    if report.groups.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Master"),
        header_cell("Duplicates"),
        header_cell("Conflicts"),
    ]);
    apply_stats_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (group, plan) in report.groups.iter().zip(&report.plans) {
        let master = group
            .master_id
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        table.add_row(vec![
            Cell::new(group.id.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(master),
            Cell::new(plan.duplicate_ids.len()),
            count_cell(plan.conflicts.len(), Color::Yellow),
        ]);
    }
    println!();
    println!("Groups:");
    println!("{table}");
}

fn print_audit_notes(result: &RunResult) {
    let Some(report) = &result.report else {
        return;
    };
    let conflicted: Vec<_> = report
        .plans
        .iter()
        .filter(|plan| plan.has_conflicts())
        .collect();
    if conflicted.is_empty() {
        return;
    }
    println!();
    for plan in conflicted {
        println!("Master {}:", plan.master_id);
        print!("{}", ConflictReport::from_plan(plan).render_audit_note());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_stats_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

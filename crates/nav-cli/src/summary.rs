use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::replay::{ContainerReport, DeliveredResult, ScenarioReport};

pub fn print_report(report: &ScenarioReport, styled: bool) {
    println!("{}", render_report(report, styled));
}

/// Container table, followed by delivered results when there are any.
pub fn render_report(report: &ScenarioReport, styled: bool) -> String {
    let mut output = container_table(&report.containers, styled).to_string();
    if !report.delivered.is_empty() {
        output.push('\n');
        output.push_str(&result_table(&report.delivered, styled).to_string());
    }
    if report.pending_results > 0 {
        output.push_str(&format!(
            "\n{} result(s) waiting for their owner",
            report.pending_results
        ));
    }
    output
}

fn container_table(containers: &[ContainerReport], styled: bool) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Container"),
        header_cell("Owner"),
        header_cell("Active"),
        header_cell("Depth"),
        header_cell("Backstack"),
    ]);
    apply_table_style(&mut table, styled);
    align_column(&mut table, 3, CellAlignment::Right);
    for container in containers {
        let key = if container.selected {
            Cell::new(format!("* {}", container.key)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(format!("  {}", container.key))
        };
        let active = match &container.active {
            Some(label) => Cell::new(label).fg(Color::Green),
            None => dim_cell("-"),
        };
        let backstack = if container.backstack.is_empty() {
            dim_cell("(empty)")
        } else {
            Cell::new(container.backstack.join(" > "))
        };
        table.add_row(vec![
            key,
            Cell::new(&container.owner),
            active,
            Cell::new(container.backstack.len()),
            backstack,
        ]);
    }
    table
}

fn result_table(delivered: &[DeliveredResult], styled: bool) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Channel"), header_cell("Result")]);
    apply_table_style(&mut table, styled);
    for result in delivered {
        let value = match &result.value {
            Some(value) => Cell::new(value.to_string()),
            None => dim_cell("closed"),
        };
        table.add_row(vec![Cell::new(&result.channel), value]);
    }
    table
}

fn apply_table_style(table: &mut Table, styled: bool) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled);
    if !styled {
        table.force_no_tty();
    }
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

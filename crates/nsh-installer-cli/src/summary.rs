//! Terminal rendering of install plans and reports.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use nsh_installer::{InstallPlan, InstallReport, Integration, PathUpdate, StepOutcome};

/// Prints a progress line for a completed step.
pub fn print_step(outcome: &StepOutcome) {
    println!("> {}", outcome.message);
}

/// Renders the plan as aligned `label: value` lines.
pub fn render_plan_text(plan: &InstallPlan) -> String {
    let rows = plan.rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            let key = format!("{label}:");
            format!("{key:<pad$}  {value}", pad = width + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the plan as a two-column table.
pub fn plan_table(plan: &InstallPlan) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (label, value) in plan.rows() {
        table.add_row(vec![label_cell(label), Cell::new(value)]);
    }
    table
}

/// Prints the dry-run plan; plain text when `styled` is false.
pub fn print_plan(plan: &InstallPlan, styled: bool) {
    println!("> Dry run: nothing will be built or installed.");
    if styled {
        println!("{}", plan_table(plan));
    } else {
        println!("{}", render_plan_text(plan));
    }
}

/// Renders the per-step summary of a successful run.
pub fn report_table(report: &InstallReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);

    let integration = match &report.integration {
        Integration::Linked { link, previous } => {
            format!("{} (replaced {previous})", link.display())
        }
        Integration::SystemPath(PathUpdate::Appended(_)) => {
            format!("{} added to PATH", report.plan.install_dir.display())
        }
        Integration::SystemPath(PathUpdate::AlreadyPresent) => {
            format!("{} already on PATH", report.plan.install_dir.display())
        }
    };
    let rows = [
        ("Privileges", "elevated".to_string()),
        ("Build", report.build_script.display().to_string()),
        (
            "Permissions",
            format!(
                "{} entries under {}",
                report.normalized_entries,
                report.plan.build_output_dir.display()
            ),
        ),
        ("Install", report.artifact.path.display().to_string()),
        ("SHA256", report.artifact.sha256.clone()),
        ("Path integration", integration),
    ];
    for (step, detail) in rows {
        table.add_row(vec![label_cell(step), ok_cell(), Cell::new(detail)]);
    }
    table
}

/// Prints the summary table after a successful run.
pub fn print_report(report: &InstallReport) {
    println!();
    println!("{}", report_table(report));
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn ok_cell() -> Cell {
    Cell::new("✓")
        .fg(Color::Green)
        .add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

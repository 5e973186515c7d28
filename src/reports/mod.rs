use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

/// Result of entering one synthetic word.
#[derive(Debug, Clone)]
pub struct WordOutcome {
    pub word: String,
    pub style: &'static str,
    pub best: String,
    pub candidates: Vec<String>,
    pub top1: bool,
    pub in_list: bool,
}

fn mark(ok: bool) -> Cell {
    if ok {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}

pub fn print_candidates(candidates: &[String]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Candidate").add_attribute(Attribute::Bold),
    ]);
    if let Some(col) = table.column_mut(0) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    for (i, c) in candidates.iter().enumerate() {
        table.add_row(vec![Cell::new(i), Cell::new(c)]);
    }
    println!("{}", table);
}

pub fn print_replay_report(text: &str, word: &str, candidates: &[String], rejected: usize) {
    println!("\nOutput: \"{}\"", text);
    println!("Current word: \"{}\"", word);
    if rejected > 0 {
        println!("⚠️  {} selection(s) were out of range and ignored", rejected);
    }
    if candidates.is_empty() {
        println!("No candidates.");
    } else {
        print_candidates(candidates);
    }
}

pub fn print_simulation_report(results: &[WordOutcome]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Word").add_attribute(Attribute::Bold),
        Cell::new("Style"),
        Cell::new("Decoded").fg(Color::Cyan),
        Cell::new("Top-1"),
        Cell::new("Listed"),
        Cell::new("Candidates"),
    ]);

    for r in results {
        table.add_row(vec![
            Cell::new(&r.word).add_attribute(Attribute::Bold),
            Cell::new(r.style),
            Cell::new(&r.best).fg(Color::Cyan),
            mark(r.top1),
            mark(r.in_list),
            Cell::new(r.candidates.join(" ")),
        ]);
    }
    println!("\n{}", table);

    let total = results.len().max(1) as f64;
    let top1 = results.iter().filter(|r| r.top1).count();
    let listed = results.iter().filter(|r| r.in_list).count();

    let mut summary = Table::new();
    summary
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    summary.add_row(vec![
        Cell::new("Summary").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Rate"),
    ]);
    for i in 1..=2 {
        if let Some(col) = summary.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    for (label, n) in [("Top-1", top1), ("In candidates", listed)] {
        summary.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{}/{}", n, results.len())),
            Cell::new(format!("{:.1}%", n as f64 / total * 100.0)),
        ]);
    }
    println!("{}", summary);
}

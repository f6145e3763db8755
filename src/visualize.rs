//! PNG output: circuit diagrams and measurement histograms.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::Rng;
use tracing::{debug, info};

use crate::algorithm::run;
use crate::circuit::{Circuit, Gate};
use crate::oracle::{check_num_inputs, FunctionType};
use crate::sampling::Counts;

const MARGIN: i32 = 30;
const LABEL_WIDTH: i32 = 60;
const COLUMN_WIDTH: i32 = 80;
const WIRE_SPACING: i32 = 70;
const BOX_HALF: i32 = 22;

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// Files whose name contains this are kept by [`cleanup_previous_files`].
pub const KEEP_MARKER: &str = "discussion";

/// One vertical slice of a circuit diagram.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagramColumn {
    /// Gates on disjoint qubits drawn side by side.
    Gates(Vec<Gate>),
    Barrier,
    /// Opaque box spanning every wire.
    Oracle,
    /// Measurement of qubits `0..k`.
    Measure(usize),
}

/// The textbook circuit with the oracle shown as a black box.
pub fn generic_columns(n: usize) -> Result<Vec<DiagramColumn>> {
    check_num_inputs(n)?;
    Ok(vec![
        DiagramColumn::Gates(vec![Gate::X(n)]),
        DiagramColumn::Barrier,
        DiagramColumn::Gates((0..=n).map(Gate::H).collect()),
        DiagramColumn::Barrier,
        DiagramColumn::Oracle,
        DiagramColumn::Barrier,
        DiagramColumn::Gates((0..n).map(Gate::H).collect()),
        DiagramColumn::Barrier,
        DiagramColumn::Measure(n),
    ])
}

/// Columns for a concrete circuit, one per layer, followed by measurement of
/// the first `measured` qubits.
pub fn circuit_columns(circuit: &Circuit, measured: usize) -> Vec<DiagramColumn> {
    let mut columns: Vec<Vec<Gate>> = vec![Vec::new(); circuit.depth()];
    for (column, gate) in circuit.layers() {
        columns[column].push(gate);
    }

    let mut result: Vec<_> = columns.into_iter().map(DiagramColumn::Gates).collect();
    if measured > 0 {
        result.push(DiagramColumn::Barrier);
        result.push(DiagramColumn::Measure(measured));
    }
    result
}

/// Bars for a probability histogram of the observed outcomes.
#[derive(Clone, Debug, PartialEq)]
pub struct BarData {
    pub labels: Vec<String>,
    pub probabilities: Vec<f64>,
    pub title: String,
}

pub fn bar_data(counts: &Counts, function_type: FunctionType) -> BarData {
    let shots = counts.shots().max(1) as f64;
    let (labels, probabilities) = counts
        .iter()
        .map(|(bits, count)| (format!("|{}⟩", bits), count as f64 / shots))
        .unzip();

    let title = if function_type.is_constant() {
        "Measurement Results: Constant Function (All measurements in |0...0⟩)"
    } else {
        "Measurement Results: Balanced Function (No measurements in |0...0⟩)"
    };

    BarData {
        labels,
        probabilities,
        title: title.to_string(),
    }
}

/// Delete `*.png` files in `dir` except those marked with [`KEEP_MARKER`].
/// Returns how many files were removed.
pub fn cleanup_previous_files(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_png = path.extension().is_some_and(|ext| ext == "png");
        let keep = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(KEEP_MARKER));
        if path.is_file() && is_png && !keep {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        }
    }

    debug!(dir = %dir.display(), removed, "cleaned output directory");
    Ok(removed)
}

fn centered(size: u32) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
}

fn wire_y(qubit: usize) -> i32 {
    MARGIN + WIRE_SPACING * qubit as i32 + WIRE_SPACING / 2
}

fn column_x(column: usize) -> i32 {
    LABEL_WIDTH + MARGIN + COLUMN_WIDTH * column as i32 + COLUMN_WIDTH / 2
}

fn draw_box(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    x: i32,
    y: i32,
    label: &str,
) -> Result<()> {
    area.draw(&Rectangle::new(
        [(x - BOX_HALF, y - BOX_HALF), (x + BOX_HALF, y + BOX_HALF)],
        WHITE.filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(x - BOX_HALF, y - BOX_HALF), (x + BOX_HALF, y + BOX_HALF)],
        BLACK.stroke_width(2),
    ))?;
    area.draw(&Text::new(label.to_string(), (x, y), centered(20)))?;
    Ok(())
}

fn draw_gate(area: &DrawingArea<BitMapBackend<'_>, Shift>, x: i32, gate: &Gate) -> Result<()> {
    match *gate {
        Gate::X(q) | Gate::H(q) => draw_box(area, x, wire_y(q), gate.label()),
        Gate::CNot { control, target } => {
            let (yc, yt) = (wire_y(control), wire_y(target));
            area.draw(&PathElement::new(vec![(x, yc), (x, yt)], BLACK.stroke_width(2)))?;
            area.draw(&Circle::new((x, yc), 6, BLACK.filled()))?;
            area.draw(&Circle::new((x, yt), 14, WHITE.filled()))?;
            area.draw(&Circle::new((x, yt), 14, BLACK.stroke_width(2)))?;
            area.draw(&PathElement::new(
                vec![(x - 14, yt), (x + 14, yt)],
                BLACK.stroke_width(2),
            ))?;
            area.draw(&PathElement::new(
                vec![(x, yt - 14), (x, yt + 14)],
                BLACK.stroke_width(2),
            ))?;
            Ok(())
        }
    }
}

/// Render `columns` over `num_of_qbits` wires into a PNG at `path`.
pub fn save_diagram(
    columns: &[DiagramColumn],
    num_of_qbits: usize,
    title: &str,
    path: &Path,
) -> Result<()> {
    let width = (LABEL_WIDTH + 2 * MARGIN + COLUMN_WIDTH * columns.len() as i32) as u32;
    let height = (2 * MARGIN + WIRE_SPACING * num_of_qbits as i32 + 60) as u32;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 26))?;

    let wire_end = width as i32 - MARGIN;
    for q in 0..num_of_qbits {
        let y = wire_y(q);
        area.draw(&Text::new(format!("q{}", q), (MARGIN, y), centered(18)))?;
        area.draw(&PathElement::new(
            vec![(LABEL_WIDTH, y), (wire_end, y)],
            BLACK.stroke_width(1),
        ))?;
    }

    let top = wire_y(0) - BOX_HALF - 8;
    let bottom = wire_y(num_of_qbits.saturating_sub(1)) + BOX_HALF + 8;
    for (i, column) in columns.iter().enumerate() {
        let x = column_x(i);
        match column {
            DiagramColumn::Gates(gates) => {
                for gate in gates {
                    draw_gate(&area, x, gate)?;
                }
            }
            DiagramColumn::Barrier => {
                let mut y = top;
                while y < bottom {
                    area.draw(&PathElement::new(
                        vec![(x, y), (x, (y + 8).min(bottom))],
                        RGBColor(120, 120, 120).stroke_width(2),
                    ))?;
                    y += 14;
                }
            }
            DiagramColumn::Oracle => {
                area.draw(&Rectangle::new(
                    [(x - 30, top), (x + 30, bottom)],
                    RGBColor(230, 230, 250).filled(),
                ))?;
                area.draw(&Rectangle::new(
                    [(x - 30, top), (x + 30, bottom)],
                    BLACK.stroke_width(2),
                ))?;
                area.draw(&Text::new("Oracle", (x, (top + bottom) / 2), centered(16)))?;
            }
            DiagramColumn::Measure(measured) => {
                for q in 0..*measured {
                    draw_box(&area, x, wire_y(q), "M")?;
                }
            }
        }
    }

    root.present()?;
    Ok(())
}

pub fn save_generic_circuit(n: usize, path: &Path) -> Result<()> {
    let columns = generic_columns(n)?;
    save_diagram(
        &columns,
        n + 1,
        "Deutsch-Jozsa Algorithm Circuit (Generic Implementation)",
        path,
    )
}

pub fn save_probability_distribution(
    counts: &Counts,
    function_type: FunctionType,
    path: &Path,
) -> Result<()> {
    let data = bar_data(counts, function_type);
    let num_bars = data.labels.len().max(1);

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, footer) = root.split_vertically(700);

    let mut chart = ChartBuilder::on(&upper)
        .caption(&data.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..num_bars).into_segmented(), 0.0..1.1)?;

    let labels = &data.labels;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_bars)
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Measured Quantum States")
        .y_desc("Probability")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(10)
            .data(data.probabilities.iter().enumerate().map(|(i, &p)| (i, p))),
    )?;

    let value_style = TextStyle::from(("sans-serif", 16).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(data.probabilities.iter().enumerate().map(|(i, &p)| {
        Text::new(
            format!("{:.3}", p),
            (SegmentValue::CenterOf(i), p),
            value_style.clone(),
        )
    }))?;

    let note = [
        "Quantum Advantage:",
        "- Classical: O(2^n) queries",
        "- Quantum: 1 query",
    ];
    for (i, line) in note.iter().enumerate() {
        footer.draw(&Text::new(
            line.to_string(),
            (20, 10 + 22 * i as i32),
            ("sans-serif", 16),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Write the generic circuit diagram plus one concrete circuit and one
/// histogram per function type into `dir`.
pub fn run_visualization<R: Rng>(
    n: usize,
    dir: &Path,
    shots: u64,
    function_types: &[FunctionType],
    rng: &mut R,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    cleanup_previous_files(dir)?;

    let mut written = Vec::new();

    let circuit_path = dir.join("dj_circuit_generic.png");
    save_generic_circuit(n, &circuit_path)?;
    info!(path = %circuit_path.display(), "saved generic circuit diagram");
    written.push(circuit_path);

    for &function_type in function_types {
        let result = run(n, function_type, shots, rng)?;

        let circuit_path = dir.join(format!("dj_circuit_{}.png", function_type));
        save_diagram(
            &circuit_columns(&result.circuit, n),
            n + 1,
            &format!("Deutsch-Jozsa Circuit ({} oracle)", function_type),
            &circuit_path,
        )?;
        written.push(circuit_path);

        let prob_path = dir.join(format!("dj_probabilities_{}.png", function_type));
        save_probability_distribution(&result.counts, function_type, &prob_path)?;
        info!(path = %prob_path.display(), %function_type, "saved measurement results");
        written.push(prob_path);
    }

    Ok(written)
}

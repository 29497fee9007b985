//! CLI logic for the Plotweave density map tool.
//!
//! Reads a JSON array of `[lon, lat]` pairs, estimates their density on a
//! map and renders the result as SVG or as an interactive HTML page.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
};

use log::{debug, info};

use plotweave::{
    Diagram, Format, PlotweaveError,
    config::AppConfig,
    containers::Map,
    elements::Text,
    geo::LonLat,
    map_layers::KdeLayer,
};

/// Run the Plotweave CLI application
///
/// Renders the points in the input file and writes the document to the
/// output file, or to stdout when no output path is given.
///
/// # Errors
///
/// Returns `PlotweaveError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed point files
/// - Layout errors
pub fn run(args: &Args) -> Result<(), PlotweaveError> {
    info!(
        input_path = args.input,
        format = args.format;
        "Processing points"
    );

    let format: Format = args.format.parse()?;
    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let points = parse_points(&source)?;
    debug!(points = points.len(); "Points loaded");

    let document = render(&app_config, points, args.title.as_deref(), format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, document)?;
            info!(output_file = path.as_str(); "Document exported successfully");
        }
        None => io::stdout().lock().write_all(document.as_bytes())?,
    }

    Ok(())
}

/// Reads a JSON array of `[lon, lat]` pairs.
fn parse_points(source: &str) -> Result<Vec<LonLat>, PlotweaveError> {
    let pairs: Vec<(f64, f64)> = serde_json::from_str(source)?;
    if pairs.is_empty() {
        return Err(PlotweaveError::config("the input contains no points"));
    }
    Ok(pairs.into_iter().map(LonLat::from).collect())
}

fn render(
    config: &AppConfig,
    points: Vec<LonLat>,
    title: Option<&str>,
    format: Format,
) -> Result<String, PlotweaveError> {
    let density = config.density();
    let layer = KdeLayer::new(points, density.kernel()?)
        .with_samples_across(density.samples_across())
        .with_bounds_margin(density.bounds_margin());

    let mut map = Map::new(density.map_width());
    map.add_layer(layer);

    let mut diagram = Diagram::from_config(config.diagram())?;
    if let Some(title) = title {
        diagram = diagram.with_title(title);
        diagram.add(Text::new(title).with_font_height(24.0));
    }
    diagram.add(map);
    diagram.render(format)
}

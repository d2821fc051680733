//! Tailrace CLI library
//!
//! This module contains the command logic behind the `tailrace` binary.
//! Every command opens the diagram through [`tailrace::editor::Editor`], so
//! the command line sees the same load warnings and consistency checks as
//! an interactive session.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, VolumeArg};
pub use error_adapter::{ErrorAdapter, Reportable};

use std::fs;

use log::{info, warn};

use tailrace::{TailraceError, config::AppConfig, diagnostic::Diagnostic, editor::Editor};

/// Run the Tailrace CLI application
///
/// # Errors
///
/// Returns `TailraceError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Diagram files that cannot be loaded
/// - Edits rejected by the model, e.g. an unknown edge id
pub fn run(args: &Args) -> Result<(), TailraceError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render {
            input,
            output,
            zoom,
        } => render(&app_config, input, output, *zoom),
        Command::Check { input } => check(&app_config, input),
        Command::Normalize { input, output } => {
            let editor = open(&app_config, input)?;
            save(editor, output.as_deref().unwrap_or(input))
        }
        Command::SetVolume {
            input,
            edge,
            volume,
            output,
        } => {
            let mut editor = open(&app_config, input)?;
            editor.update_edge_volume(edge, volume.0)?;
            info!(edge, volume:? = volume.0; "Edge volume updated");
            save(editor, output.as_deref().unwrap_or(input))
        }
    }
}

fn open(config: &AppConfig, input: &str) -> Result<Editor, TailraceError> {
    info!(input_path = input; "Opening diagram");
    let mut editor = Editor::new(config.clone())?;
    editor.open(input)?;
    for diagnostic in editor.diagnostics() {
        warn!(code = diagnostic.code().as_str(); "{}", diagnostic.message());
    }
    Ok(editor)
}

fn save(mut editor: Editor, output: &str) -> Result<(), TailraceError> {
    editor.save(output)?;
    info!(output_file = output; "Diagram saved");
    Ok(())
}

fn render(config: &AppConfig, input: &str, output: &str, zoom: f32) -> Result<(), TailraceError> {
    let editor = open(config, input)?;
    let zoom = config.render().clamp_zoom(zoom);
    let svg = tailrace::render_svg(editor.diagram(), config, zoom)?;

    fs::write(output, svg)?;

    info!(output_file = output; "SVG exported successfully");
    Ok(())
}

fn check(config: &AppConfig, input: &str) -> Result<(), TailraceError> {
    let editor = open(config, input)?;
    let diagnostics = editor.diagnostics();
    let graph = editor.diagram().graph();

    print!("{}", format_report(&diagnostics)?);
    println!(
        "{input}: {} nodes, {} edges, {} zones, {} warning(s)",
        graph.node_count(),
        graph.edge_count(),
        graph.zones().len(),
        diagnostics.len()
    );
    Ok(())
}

/// Renders warnings with miette's graphical handler, one report per warning.
fn format_report(diagnostics: &[Diagnostic]) -> Result<String, TailraceError> {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    for reportable in error_adapter::diagnostics_to_reportables(diagnostics) {
        reporter
            .render_report(&mut writer, &reportable)
            .map_err(|err| TailraceError::Export(err.to_string()))?;
    }
    Ok(writer)
}

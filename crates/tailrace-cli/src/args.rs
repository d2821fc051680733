use clap::{Parser, Subcommand};

/// Tailrace: inspect, render and repair flow diagram files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a diagram file to SVG
    Render {
        /// Path to the diagram file
        input: String,

        /// Path to output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,

        /// Zoom factor, clamped to the configured range
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f32,
    },

    /// Load a diagram file and report its warnings
    Check {
        /// Path to the diagram file
        input: String,
    },

    /// Rewrite a diagram file with ids and defaults filled in
    Normalize {
        /// Path to the diagram file
        input: String,

        /// Where to write the result; the input is rewritten when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Set or clear the volume of one edge
    SetVolume {
        /// Path to the diagram file
        input: String,

        /// Id of the edge to update
        edge: String,

        /// New volume, or `none` to clear it
        #[arg(value_parser = parse_volume)]
        volume: VolumeArg,

        /// Where to write the result; the input is rewritten when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// A volume given on the command line. `None` clears the stored volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeArg(pub Option<f64>);

fn parse_volume(value: &str) -> Result<VolumeArg, String> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(VolumeArg(None));
    }
    value
        .parse::<f64>()
        .map(|volume| VolumeArg(Some(volume)))
        .map_err(|err| format!("`{value}` is not a number: {err}"))
}

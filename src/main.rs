//! OntoScope CLI
//!
//! Usage:
//!   ontoscope [OPTIONS] [FILE]
//!
//! Options:
//!   --width <PX>             Viewport width
//!   --height <PX>            Viewport height
//!   --scale <FACTOR>         Zoom scale (clamped to 0.5..=10)
//!   --translate-x <PX>       Horizontal pan
//!   --translate-y <PX>       Vertical pan
//!   -s, --stylesheet <FILE>  Stylesheet file for colors (TOML format)
//!   -c, --config <FILE>      Layout configuration (TOML format)
//!   --strict                 Fail on questions referencing unknown axis values
//!   --export <DOMAIN>        Print the JSON session export instead of SVG
//!   -d, --debug              Print the layout table and outline label boxes
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, Level};

use ontoscope::{
    export_filename, export_session, render_data, LayoutConfig, PlotData, RenderConfig,
    SessionStore, StoreError, Stylesheet, Viewport, ZoomTransform,
};

#[derive(Parser)]
#[command(name = "ontoscope")]
#[command(about = "Lay out competency questions on a domain × granularity plot")]
struct Cli {
    /// Input snapshot (reads JSON from stdin if not provided)
    input: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 900.0)]
    height: f64,

    /// Zoom scale; at or below 0.5 questions are drawn as points
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Horizontal pan in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    translate_x: f64,

    /// Vertical pan in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    translate_y: f64,

    /// Stylesheet file for colors (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Layout configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on questions that reference unknown axis values
    #[arg(long)]
    strict: bool,

    /// Print the JSON export for a session with this domain name instead of SVG
    #[arg(long, value_name = "DOMAIN")]
    export: Option<String>,

    /// Debug mode: print the layout table and outline label boxes
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .init();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => Stylesheet::default().merged_with(s),
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    let layout = match &cli.config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading layout config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LayoutConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let data = match PlotData::from_json_str(&source) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if cli.strict {
        if let Err(e) = data.validate() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    for orphan in data.orphans() {
        debug!(cq = %orphan.id, key = %orphan.intersection(), "question is not on the plot");
    }

    if let Some(domain) = &cli.export {
        print_export(domain, &data);
        return;
    }

    let config = RenderConfig::new()
        .with_layout(layout)
        .with_stylesheet(stylesheet)
        .with_viewport(Viewport::new(cli.width, cli.height))
        .with_transform(ZoomTransform::new(cli.scale, cli.translate_x, cli.translate_y))
        .with_debug(cli.debug);
    println!("{}", render_data(&data, &config));
}

/// Copy a snapshot into a session of the store
fn load_session(store: &mut SessionStore, session_id: &str, data: &PlotData) -> Result<(), StoreError> {
    for dv in data
        .domain_coverage_values
        .iter()
        .chain(&data.terminology_granularity_values)
        .filter(|dv| dv.is_relevant)
    {
        store.add_dimension_value(session_id, dv.dimension, dv.value.clone())?;
    }
    for cq in &data.competency_questions {
        let stored = store.add_question(session_id, cq.clone())?;
        store.set_question_relevance(&stored.id, cq.is_relevant)?;
    }
    Ok(())
}

/// Load a snapshot into a fresh session and print its export
fn print_export(domain: &str, data: &PlotData) {
    let mut store = SessionStore::new();
    let session = store.create_session(domain);

    let result = load_session(&mut store, &session.id, data)
        .and_then(|()| export_session(&store, &session.id, Utc::now()));

    let export = match result {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    debug!(
        file = %export_filename(domain, Utc::now().date_naive()),
        "export ready"
    );
    match export.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"OntoScope - competency question scoping plot

USAGE:
    ontoscope [OPTIONS] [FILE]
    cat snapshot.json | ontoscope > plot.svg

OPTIONS:
    --width, --height      Viewport size in pixels (default 1200x900)
    --scale                Zoom scale: <=0.5 points, <=1.3 summary labels, above that every term
    --translate-x/-y       Pan offset in pixels
    -s, --stylesheet       Custom color palette (TOML file)
    -c, --config           Layout configuration (TOML file)
    --strict               Reject questions on unknown axis values
    --export <DOMAIN>      Print the JSON export instead of SVG
    -d, --debug            Print the layout table and outline label boxes
    -h, --help             Print help

INPUT:
    {{
      "domainCoverageValues": [{{"id": "d1", "value": "Clinical"}}],
      "terminologyGranularityValues": [{{"id": "g1", "value": "First-level"}}],
      "competencyQuestions": [{{
        "id": "q1", "question": "Which patients are admitted?",
        "domainCoverage": "Clinical", "terminologyGranularity": "First-level",
        "suggestedTerms": ["Patient", "Admission"], "type": "subject"
      }}]
    }}"#
    );
}

#![forbid(unsafe_code)]

use moray_core::command::ExportOptions;
use moray_core::{Theme, parse_snapshot};
use moray_render::{HeadlessCanvas, TopologyView};
use std::io::Read as _;

const USAGE: &str = "moray-cli: export a network topology snapshot to SVG

Usage: moray-cli [options] <snapshot.json | ->

Options:
  -o, --output <file>      Write the SVG here (default: stdout)
  --theme <light|dark>     Color theme (default: light)
  --background <color>     Export background color
  --transparent            No export background
  --font-color <color>     Label/text color override
  --link-thickness <px>    Link stroke width (default: 1.5)
  --no-labels              Leave interface labels out of the export
  --scale <ratio>          Output pixel ratio for injected labels
  -h, --help               Show this help";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Snapshot(moray_core::Error),
    Render(moray_render::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Snapshot(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<moray_core::Error> for CliError {
    fn from(value: moray_core::Error) -> Self {
        Self::Snapshot(value)
    }
}

impl From<moray_render::Error> for CliError {
    fn from(value: moray_render::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    output: Option<String>,
    dark: bool,
    options: ExportOptions,
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(USAGE)),
            "--output" | "-o" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                args.output = Some(path.clone());
            }
            "--theme" => {
                let Some(theme) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                args.dark = match theme.as_str() {
                    "light" => false,
                    "dark" => true,
                    _ => return Err(CliError::Usage(USAGE)),
                };
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                if !bg.trim().is_empty() {
                    args.options.background_color = Some(bg.trim().to_string());
                }
            }
            "--transparent" => args.options.transparent = true,
            "--font-color" => {
                let Some(color) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                args.options.font_color = Some(color.clone());
            }
            "--link-thickness" => {
                let Some(px) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                args.options.link_thickness =
                    px.parse::<f64>().map_err(|_| CliError::Usage(USAGE))?;
                if !(args.options.link_thickness.is_finite() && args.options.link_thickness > 0.0) {
                    return Err(CliError::Usage(USAGE));
                }
            }
            "--no-labels" => args.options.include_labels = false,
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(USAGE));
                };
                args.options.scale = scale.parse::<f64>().map_err(|_| CliError::Usage(USAGE))?;
                if !(args.options.scale.is_finite() && args.options.scale > 0.0) {
                    return Err(CliError::Usage(USAGE));
                }
            }
            other if args.input.is_none() && (!other.starts_with('-') || other == "-") => {
                args.input = Some(other.to_string());
            }
            _ => return Err(CliError::Usage(USAGE)),
        }
    }

    if args.input.is_none() {
        return Err(CliError::Usage(USAGE));
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), CliError> {
    let input = args.input.as_deref().unwrap_or("-");
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };

    let snapshot = parse_snapshot(&text)?;

    let mut view = TopologyView::new(HeadlessCanvas::new());
    view.set_theme(if args.dark {
        Theme::dark()
    } else {
        Theme::light()
    });
    view.render("default", &snapshot);
    let svg = view.export_svg(&args.options)?;

    match args.output.as_deref() {
        Some(path) => std::fs::write(path, svg)?,
        None => print!("{svg}"),
    }
    Ok(())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

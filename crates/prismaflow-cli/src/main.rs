use prismaflow::render::raster::{self, RasterError, RasterOptions};
use prismaflow::render::{self, DEFAULT_TITLE, Graphviz, HeadlessError};
use prismaflow::{ArrowShape, DiagramOptions, FlowData, ReadOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PRISMAFLOW_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Data(prismaflow::Error),
    Render(HeadlessError),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Data(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<prismaflow::Error> for CliError {
    fn from(value: prismaflow::Error) -> Self {
        Self::Data(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Dot,
    Render,
    Decorate,
    Convert,
    Check,
    Template,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Svg,
    Html,
    Png,
    Jpeg,
    Pdf,
}

impl OutputFormat {
    fn is_raster(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Pdf)
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Html => "html",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "html" => Ok(Self::Html),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

/// Command-line overrides, applied on top of `--config` regardless of flag order.
#[derive(Debug, Default)]
struct OptionOverrides {
    config: Option<String>,
    no_previous: bool,
    no_other: bool,
    interactive: bool,
    font: Option<String>,
    font_size: Option<f64>,
    title_colour: Option<String>,
    greybox_colour: Option<String>,
    main_colour: Option<String>,
    arrow_colour: Option<String>,
    arrow_head: Option<ArrowShape>,
    arrow_tail: Option<ArrowShape>,
}

impl OptionOverrides {
    fn resolve(&self) -> Result<DiagramOptions, CliError> {
        let mut options = match &self.config {
            Some(path) => DiagramOptions::from_path(path)?,
            None => DiagramOptions::default(),
        };
        if self.no_previous {
            options.previous = false;
        }
        if self.no_other {
            options.other = false;
        }
        if self.interactive {
            options.interactive = true;
        }
        let text = [
            (&self.font, &mut options.font),
            (&self.title_colour, &mut options.title_colour),
            (&self.greybox_colour, &mut options.greybox_colour),
            (&self.main_colour, &mut options.main_colour),
            (&self.arrow_colour, &mut options.arrow_colour),
        ];
        for (value, slot) in text {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        if let Some(size) = self.font_size {
            options.font_size = size;
        }
        if let Some(head) = self.arrow_head {
            options.arrow_head = head;
        }
        if let Some(tail) = self.arrow_tail {
            options.arrow_tail = tail;
        }
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    format: Option<OutputFormat>,
    out: Option<String>,
    svg: Option<String>,
    title: Option<String>,
    pretty: bool,
    strict: bool,
    render_scale: f32,
    background: Option<String>,
    overrides: OptionOverrides,
}

fn usage() -> &'static str {
    "prismaflow-cli\n\
\n\
USAGE:\n\
  prismaflow-cli dot      [diagram options] [<csv>|-]\n\
  prismaflow-cli render   [--format svg|html|png|jpg|pdf] [--out <path>] [--title <text>] [diagram options] [raster options] [<csv>|-]\n\
  prismaflow-cli decorate --svg <rendered.svg> [--format svg|html] [--out <path>] [--title <text>] [diagram options] [<csv>|-]\n\
  prismaflow-cli convert  --format png|jpg|pdf [--out <path>] [raster options] [<svg>|-]\n\
  prismaflow-cli check    [--pretty] [--strict] [diagram options] [<csv>|-]\n\
  prismaflow-cli template\n\
\n\
DIAGRAM OPTIONS:\n\
  --config <json|yaml>  --no-previous  --no-other  --interactive  --strict\n\
  --font <name>  --font-size <pt>  --title-colour <c>  --greybox-colour <c>  --main-colour <c>\n\
  --arrow-colour <c>  --arrow-head <shape>  --arrow-tail <shape>\n\
\n\
RASTER OPTIONS:\n\
  --scale <n>  --background <css-color>\n\
\n\
NOTES:\n\
  - If <csv> is omitted or '-', input is read from stdin.\n\
  - Graphviz is run as `dot -Kneato -Tsvg`; set PRISMAFLOW_DOT to use another binary.\n\
  - PNG/JPG/PDF output defaults to writing next to the input file (or ./out.<ext> for stdin).\n\
  - Logging goes to stderr; set PRISMAFLOW_LOG (e.g. `debug`) to change the level.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let o = &mut args.overrides;
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "dot" => args.command = Command::Dot,
            "render" => args.command = Command::Render,
            "decorate" => args.command = Command::Decorate,
            "convert" => args.command = Command::Convert,
            "check" => args.command = Command::Check,
            "template" => args.command = Command::Template,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--no-previous" => o.no_previous = true,
            "--no-other" => o.no_other = true,
            "--interactive" => o.interactive = true,
            "--config" => o.config = Some(next_value(&mut it)?.clone()),
            "--font" => o.font = Some(next_value(&mut it)?.clone()),
            "--title-colour" => o.title_colour = Some(next_value(&mut it)?.clone()),
            "--greybox-colour" => o.greybox_colour = Some(next_value(&mut it)?.clone()),
            "--main-colour" => o.main_colour = Some(next_value(&mut it)?.clone()),
            "--arrow-colour" => o.arrow_colour = Some(next_value(&mut it)?.clone()),
            "--font-size" => {
                let size = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
                o.font_size = Some(size);
            }
            "--arrow-head" => {
                let shape = next_value(&mut it)?
                    .parse::<ArrowShape>()
                    .map_err(|_| CliError::Usage(usage()))?;
                o.arrow_head = Some(shape);
            }
            "--arrow-tail" => {
                let shape = next_value(&mut it)?
                    .parse::<ArrowShape>()
                    .map_err(|_| CliError::Usage(usage()))?;
                o.arrow_tail = Some(shape);
            }
            "--format" => {
                let format = next_value(&mut it)?
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.format = Some(format);
            }
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--svg" => args.svg = Some(next_value(&mut it)?.clone()),
            "--title" => args.title = Some(next_value(&mut it)?.clone()),
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    let format_ok = match (args.command, args.format) {
        (Command::Decorate, Some(f)) => matches!(f, OutputFormat::Svg | OutputFormat::Html),
        (Command::Convert, f) => f.is_some_and(OutputFormat::is_raster),
        _ => true,
    };
    if !format_ok || (args.command == Command::Decorate && args.svg.is_none()) {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            std::io::stdout().lock().write_all(text.as_bytes())?;
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: Option<&str>, input: Option<&str>, ext: &str) -> Result<(), CliError> {
    let out = out.map(str::to_string).unwrap_or_else(|| {
        default_raster_out_path(input, ext)
            .to_string_lossy()
            .to_string()
    });
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        tracing::info!(path = %out, bytes = bytes.len(), "writing output");
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

fn load_data(args: &Args, options: &DiagramOptions) -> Result<FlowData, CliError> {
    let text = read_input(args.input.as_deref())?;
    let read = if args.strict {
        ReadOptions::strict_for(options)
    } else {
        ReadOptions::lenient()
    };
    Ok(prismaflow::read_template_str(&text, read)?)
}

fn raster_options(args: &Args, options: &DiagramOptions) -> RasterOptions {
    RasterOptions {
        scale: args.render_scale,
        background: args.background.clone(),
        font_family: options.font.clone(),
        ..RasterOptions::default()
    }
}

fn write_svg_as(
    svg: &str,
    format: OutputFormat,
    args: &Args,
    options: &DiagramOptions,
) -> Result<(), CliError> {
    let input = args.input.as_deref();
    let out = args.out.as_deref();
    match format {
        OutputFormat::Svg => write_text(svg, out),
        OutputFormat::Html => {
            let title = args.title.as_deref().unwrap_or(DEFAULT_TITLE);
            write_text(&render::render_widget_html(svg, title), out)
        }
        OutputFormat::Png => {
            let bytes = raster::svg_to_png(svg, &raster_options(args, options))?;
            write_bytes(&bytes, out, input, format.extension())
        }
        OutputFormat::Jpeg => {
            let bytes = raster::svg_to_jpeg(svg, &raster_options(args, options))?;
            write_bytes(&bytes, out, input, format.extension())
        }
        OutputFormat::Pdf => {
            let bytes = raster::svg_to_pdf(svg, &raster_options(args, options))?;
            write_bytes(&bytes, out, input, format.extension())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Template => write_text(prismaflow::template_csv(), args.out.as_deref()),
        Command::Check => {
            let options = args.overrides.resolve()?;
            let data = load_data(&args, &options)?;
            let stdout = std::io::stdout().lock();
            if args.pretty {
                serde_json::to_writer_pretty(stdout, &data)?;
            } else {
                serde_json::to_writer(stdout, &data)?;
            }
            Ok(())
        }
        Command::Dot => {
            let options = args.overrides.resolve()?;
            let data = load_data(&args, &options)?;
            write_text(&render::render_dot(&data, &options), args.out.as_deref())
        }
        Command::Render => {
            let options = args.overrides.resolve()?;
            let data = load_data(&args, &options)?;
            let svg = render::render_svg_sync(&data, &options, &Graphviz::default())?;
            write_svg_as(&svg, args.format.unwrap_or_default(), &args, &options)
        }
        Command::Decorate => {
            let options = args.overrides.resolve()?;
            let data = load_data(&args, &options)?;
            let svg_path = args.svg.as_deref().ok_or(CliError::Usage(usage()))?;
            let svg = std::fs::read_to_string(svg_path)?;
            let diagram = render::build_flow_diagram(&data, &options);
            let decorated = render::decorate_svg(
                &svg,
                &diagram,
                &data,
                &render::DecorateOptions::from_diagram_options(&options),
            )
            .map_err(HeadlessError::from)?;
            write_svg_as(&decorated, args.format.unwrap_or_default(), &args, &options)
        }
        Command::Convert => {
            let options = args.overrides.resolve()?;
            let svg = read_input(args.input.as_deref())?;
            write_svg_as(&svg, args.format.unwrap_or_default(), &args, &options)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .try_init();
}

fn main() {
    init_tracing();

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
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

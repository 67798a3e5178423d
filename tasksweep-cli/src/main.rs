use clap::{Parser, Subcommand};
use serde::Serialize;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tasksweep::image::io::load_gray_image;
use tasksweep::template::MIN_TEMPLATE_SIDE;
use tasksweep::{
    CancelToken, Desktop, Frame, FrameMatcher, IconScanner, MatchConfig, Point, Supervisor,
    TaskProcessor, Template, TemplateStore,
};
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

use config::ReplayConfig;
use replay::{Action, LoggingInput, ReplaySource, ReplayTriggers, VirtualPacer};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Tasksweep screen agent (offline tools)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Print the JSON schema of the replay config and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example replay config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable debug-level logs.
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find every occurrence of a marker in one screenshot.
    Scan {
        #[arg(long, value_name = "FILE")]
        frame: PathBuf,
        #[arg(long, value_name = "FILE")]
        template: PathBuf,
        /// Acceptance threshold on the correlation score.
        #[arg(long, default_value_t = MatchConfig::default().threshold)]
        threshold: f32,
        /// Write the JSON result here instead of stdout.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Run the full workflow against a directory of recorded screenshots.
    Replay {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct PointRecord {
    x: i32,
    y: i32,
}

impl From<Point> for PointRecord {
    fn from(value: Point) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    template: String,
    count: usize,
    points: Vec<PointRecord>,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    frames: usize,
    frames_served: usize,
    tasks: Vec<PointRecord>,
    tasks_completed: usize,
    missing_templates: Vec<&'static str>,
    virtual_time_ms: u128,
    actions: Vec<Action>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.trace { "tasksweep=debug" } else { "tasksweep=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    match cli.command {
        Some(Command::Scan {
            frame,
            template,
            threshold,
            output,
        }) => scan(&frame, &template, threshold, output.as_deref()),
        Some(Command::Replay { config }) => run_replay(&config),
        None => Err("no command given; see --help".into()),
    }
}

fn scan(
    frame_path: &Path,
    template_path: &Path,
    threshold: f32,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Frame::new(load_gray_image(frame_path)?);
    let name = template_path.display().to_string();
    let template = Template::new(
        name.as_str(),
        load_gray_image(template_path)?,
        MIN_TEMPLATE_SIDE,
    )?;

    let scanner = IconScanner::new(
        FrameMatcher::new(MatchConfig {
            threshold,
            ..MatchConfig::default()
        }),
        tasksweep::suppress::DEFAULT_SUPPRESSION_PAD,
    );
    let points = scanner.find_all(&frame, &template, &CancelToken::new());
    let result = ScanOutput {
        template: name,
        count: points.len(),
        points: points.into_iter().map(PointRecord::from).collect(),
    };
    write_json(&result, output)
}

fn run_replay(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_text = fs::read_to_string(config_path)?;
    let config: ReplayConfig = serde_json::from_str(&config_text)?;
    if config.frames_dir.is_empty() || config.templates_dir.is_empty() {
        return Err("frames_dir and templates_dir must be set in the config".into());
    }
    let agent = config.agent_config();

    let templates = TemplateStore::load_dir(&config.templates_dir, agent.min_template_side);
    let missing_templates: Vec<_> = templates.missing().iter().map(|m| m.file_name()).collect();
    if !missing_templates.is_empty() {
        tracing::warn!(missing = ?missing_templates, "some markers will never match");
    }

    let cancel = CancelToken::new();
    let clock = Rc::new(Cell::new(Duration::ZERO));
    let source = ReplaySource::from_dir(Path::new(&config.frames_dir), cancel.clone())?;
    let frames = source.len();
    if frames == 0 {
        return Err(format!("no screenshots found in {}", config.frames_dir).into());
    }
    let served = source.served();
    let input = LoggingInput::new(agent.input, Rc::clone(&clock));
    let actions = input.actions();
    let mut desktop = Desktop::new(source, input, VirtualPacer::new(Rc::clone(&clock)));

    let triggers = ReplayTriggers::new(Rc::clone(&served), config.idle_polls_before_exit);
    let mut supervisor = Supervisor::new(TaskProcessor::new(agent, templates), triggers, cancel);
    let exit = supervisor.run(&mut desktop);
    tracing::info!(?exit, cursor = supervisor.cursor(), "replay finished");

    let output = ReplayOutput {
        frames,
        frames_served: served.get(),
        tasks: supervisor
            .tasks()
            .iter()
            .map(|item| PointRecord::from(item.position))
            .collect(),
        tasks_completed: supervisor.cursor(),
        missing_templates,
        virtual_time_ms: clock.get().as_millis(),
        actions: actions.borrow().clone(),
    };
    write_json(&output, None)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

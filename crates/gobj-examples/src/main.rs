use std::sync::Arc;

use facet::Facet;
use figue as args;
use gobj::{ContainerPolicy, DetectorConfig, Tracker};
use gobj_examples::host::DemoHost;
use gobj_examples::scenarios;

type AnyResult<T> = Result<T, String>;

const DEMO_SCRIPTS: [&str; 4] = ["Main", "Scene_Map", "Spriteset_Map", "Scene_Battle"];

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::named, default)]
    log_path: Option<String>,
    #[facet(args::named, default)]
    filter_hidden: bool,
    #[facet(args::named, default)]
    mark_invisible: bool,
    #[facet(args::named, default)]
    abridged: bool,
    #[facet(args::named, default)]
    snapshot: bool,
    #[facet(args::subcommand)]
    command: CommandKind,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum CommandKind {
    DisposedWindow,
    ForgottenSprite,
    HiddenSprite,
    SharedPlane,
    ViewportAutoRelease,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> AnyResult<()> {
    let cli = parse_cli()?;
    let config = config_from_cli(&cli)?;

    let host = Arc::new(DemoHost::new(DEMO_SCRIPTS));
    let tracker = Tracker::activate(config, host.clone());
    if !tracker.detector().is_enabled() {
        println!("Both console and log file output are off; nothing will be tracked");
    }

    dispatch_command(&tracker, &host, cli.command)?;

    if cli.snapshot {
        println!("{}", tracker.detector().snapshot_json()?);
    }
    Ok(())
}

fn parse_cli() -> AnyResult<Cli> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("gobj-examples")
                .description("Run gobj leak scenarios against an in-memory host")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();

    args::Driver::new(figue_config)
        .run()
        .into_result()
        .map(|v| v.value)
        .map_err(|e| e.to_string())
}

/// Environment first, command-line flags on top.
fn config_from_cli(cli: &Cli) -> AnyResult<DetectorConfig> {
    let mut config = DetectorConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(path) = &cli.log_path {
        config.log_path = path.into();
    }
    if cli.filter_hidden {
        config.filter_invisible_or_transparent = true;
    }
    if cli.mark_invisible {
        config.container_policy = ContainerPolicy::MarkInvisible;
    }
    if cli.abridged {
        config.abridged_trace = true;
    }
    Ok(config)
}

fn dispatch_command(tracker: &Tracker, host: &DemoHost, command: CommandKind) -> AnyResult<()> {
    match command {
        CommandKind::DisposedWindow => scenarios::disposed_window::run(tracker, host),
        CommandKind::ForgottenSprite => scenarios::forgotten_sprite::run(tracker, host),
        CommandKind::HiddenSprite => scenarios::hidden_sprite::run(tracker, host),
        CommandKind::SharedPlane => scenarios::shared_plane::run(tracker, host),
        CommandKind::ViewportAutoRelease => scenarios::viewport_auto_release::run(tracker, host),
    }
}

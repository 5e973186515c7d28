use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;
use typeforge::config::Config;
use typeforge::geometry::{KeyLayout, StandardLayout};
use typeforge::lexicon::Lexicon;
use typeforge::{TfResult, TypeForgeError};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Word list: `input weight [output]` per line.
    #[arg(global = true, short, long, default_value = "data/lexicon_en.txt")]
    lexicon: String,

    /// Keep only the first N lexicon entries.
    #[arg(global = true, long)]
    limit: Option<usize>,

    /// Built-in layout name (qwerty, qwertz, azerty, dvorak, colemak) or a JSON layout file.
    #[arg(global = true, long, default_value = "qwerty")]
    layout: String,

    /// Key pitch of the built-in layouts, in plane units.
    #[arg(global = true, long, default_value_t = 0.02)]
    key_pitch: f32,

    /// JSON parameter file; flags given on the command line take precedence.
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Replay(cmd::replay::ReplayArgs),
    Simulate(cmd::simulate::SimulateArgs),
}

fn init_tracing(debug: bool) {
    let default = if debug { "typeforge=debug" } else { "typeforge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// File parameters as the base, explicit CLI flags on top.
fn resolve_config(path: Option<&str>, cli: &Config, matches: &ArgMatches) -> TfResult<Config> {
    let mut config = match path {
        Some(p) => {
            println!("⚙️  Loading parameters from: {}", p);
            Config::load_from_file(p)?
        }
        None => Config::default(),
    };
    config.merge_from_cli(cli, matches);
    config.validate()?;
    Ok(config)
}

fn load_inputs(cli: &Cli) -> TfResult<(Arc<KeyLayout>, Arc<Lexicon>)> {
    let layout = match StandardLayout::from_str(&cli.layout) {
        Ok(kind) => KeyLayout::standard(kind, cli.key_pitch),
        Err(_) if Path::new(&cli.layout).is_file() => {
            println!("⌨️  Loading layout: {}", cli.layout);
            KeyLayout::load_from_file(&cli.layout)?
        }
        Err(_) => {
            let known: Vec<String> = StandardLayout::iter().map(|l| l.to_string()).collect();
            return Err(TypeForgeError::Validation(format!(
                "'{}' is neither a layout file nor one of: {}",
                cli.layout,
                known.join(", ")
            )));
        }
    };
    println!("📖 Loading lexicon: {}", cli.lexicon);
    let lexicon = Lexicon::load_from_file(&cli.lexicon, cli.limit)?;
    lexicon.validate_against(&layout)?;
    Ok((Arc::new(layout), Arc::new(lexicon)))
}

fn main() {
    // Raw matches tell user-given flags apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_tracing(cli.debug);

    let (cli_config, sub_matches) = match &cli.command {
        Commands::Replay(args) => (&args.config, matches.subcommand_matches("replay")),
        Commands::Simulate(args) => (&args.config, matches.subcommand_matches("simulate")),
    };
    let sub_matches = sub_matches.unwrap_or(&matches);

    let result = resolve_config(cli.config.as_deref(), cli_config, sub_matches).and_then(|config| {
        let (layout, lexicon) = load_inputs(&cli)?;
        match &cli.command {
            Commands::Replay(args) => cmd::replay::run(args, layout, lexicon, config),
            Commands::Simulate(args) => cmd::simulate::run(args, layout, lexicon, config),
        }
    });

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        process::exit(1);
    }
}

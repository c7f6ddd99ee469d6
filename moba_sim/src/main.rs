//! moba_sim - headless duel runner for moba_core
//!
//! Spawns two champions from the roster, levels them, buys their items and
//! lets a simple pilot cast and attack until one of them dies.
//!
//! Run with: `cargo run -p moba_sim -- duel lyra thorne --level 9`

mod duel;

use anyhow::{Context, Result};
use clap::Parser;
use duel::{Contestant, DuelReport, DuelSimulation, SideReport};
use moba_core::config::{load_game_constants, load_item_catalog, load_unit_defs};
use moba_core::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Headless MOBA combat simulator
#[derive(Parser)]
#[command(name = "moba_sim")]
#[command(about = "Run champion duels against the moba_core engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding units.toml, items.toml and game.toml (built-in
    /// content when omitted; missing files fall back individually)
    #[arg(short, long, value_name = "DIR", global = true)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Fight two units until one dies or time runs out
    Duel(DuelArgs),

    /// List the unit roster and the item shop
    Roster,
}

#[derive(Parser)]
struct DuelArgs {
    /// Blue side unit id
    blue: String,

    /// Red side unit id
    red: String,

    /// Level for both sides
    #[arg(short, long, default_value_t = 6)]
    level: u32,

    /// Blue side items, comma separated
    #[arg(long, value_delimiter = ',')]
    blue_items: Vec<String>,

    /// Red side items, comma separated
    #[arg(long, value_delimiter = ',')]
    red_items: Vec<String>,

    /// Maximum duel length in seconds
    #[arg(short, long, default_value_t = 60.0)]
    duration: f64,

    /// Simulation steps per second
    #[arg(long, default_value_t = 30)]
    tick_rate: u32,

    /// RNG seed for crits
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human readable summary
    Summary,
    /// Report as JSON
    Json,
    /// Full combat log as JSON lines
    Events,
}

/// Units, items and constants the run uses
struct Content {
    units: UnitCatalog,
    items: ItemCatalog,
    constants: GameConstants,
}

impl Content {
    fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Content {
                units: default_units(),
                items: default_items(),
                constants: GameConstants::default(),
            });
        };

        let units_path = dir.join("units.toml");
        let units = if units_path.exists() {
            load_unit_defs(&units_path).with_context(|| format!("loading {}", units_path.display()))?
        } else {
            default_units()
        };

        let items_path = dir.join("items.toml");
        let items = if items_path.exists() {
            load_item_catalog(&items_path).with_context(|| format!("loading {}", items_path.display()))?
        } else {
            default_items()
        };

        let game_path = dir.join("game.toml");
        let constants = if game_path.exists() {
            load_game_constants(&game_path).with_context(|| format!("loading {}", game_path.display()))?
        } else {
            GameConstants::default()
        };

        tracing::info!(units = units.len(), items = items.len(), dir = %dir.display(), "content loaded");
        Ok(Content {
            units,
            items,
            constants,
        })
    }
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let content = Content::load(cli.content.as_deref())?;

    match cli.command {
        Command::Duel(args) => run_duel(&content, args),
        Command::Roster => {
            print_roster(&content);
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays clean for reports. `RUST_LOG` overrides
/// the default `info` level.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_duel(content: &Content, args: DuelArgs) -> Result<()> {
    anyhow::ensure!(args.tick_rate > 0, "tick rate must be positive");
    anyhow::ensure!(args.duration > 0.0, "duration must be positive");

    let blue = Contestant::new(&args.blue, args.level).with_items(args.blue_items);
    let red = Contestant::new(&args.red, args.level).with_items(args.red_items);
    let mut duel = DuelSimulation::setup(
        &content.units,
        &content.items,
        content.constants.clone(),
        &blue,
        &red,
        args.seed,
    )
    .context("setting up duel")?;

    duel.run(args.duration, 1.0 / f64::from(args.tick_rate));

    match args.format {
        OutputFormat::Summary => print_report(&duel.report()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&duel.report())?),
        OutputFormat::Events => {
            for event in duel.sim.events() {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }
    Ok(())
}

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

fn print_side(label: &str, side: &SideReport, duration: f64) {
    println!("  {} - {} (level {})", label, side.champion, side.level);
    if !side.items.is_empty() {
        println!("    Items: {}", side.items.join(", "));
    }
    println!("    Damage Dealt: {:.0} ({:.1} DPS)", side.damage_dealt, side.dps(duration));
    println!("    Absorbed by Shields: {:.0}", side.damage_shielded);
    println!("    Healing Done: {:.0}", side.healing_done);
    println!("    Casts: {}", side.casts);
    println!(
        "    Attacks: {} ({} misses, {:.1}% crit)",
        side.attacks,
        side.misses,
        side.crit_rate()
    );
    println!("    Passives Fired: {}", side.passives_fired);
    println!("    Health Remaining: {:.0}", side.health_remaining);
    if let Some(time) = side.kill_time {
        println!("    Kill at {:.2}s", time);
    }
}

fn print_report(report: &DuelReport) {
    separator(&format!("{} vs {}", report.blue.champion, report.red.champion));
    print_side("Blue", &report.blue, report.duration);
    println!();
    print_side("Red", &report.red, report.duration);

    separator("Result");
    match report.winner {
        Some(0) => println!("  {} wins after {:.2}s", report.blue.champion, report.duration),
        Some(_) => println!("  {} wins after {:.2}s", report.red.champion, report.duration),
        None => println!("  No winner after {:.2}s", report.duration),
    }
    println!("  Seed: {}", report.seed);
}

fn print_roster(content: &Content) {
    separator("Units");
    for id in content.units.ids() {
        let Some(def) = content.units.get(id) else {
            continue;
        };
        println!("  {:<14} {:<16} {:?}", def.id, def.name, def.kind);
        for ability in &def.abilities {
            println!("      [{:?}] {} - {}", ability.slot, ability.name, ability.description);
        }
        for passive in &def.passives {
            println!("      [passive] {}", passive.name);
        }
    }

    separator("Items");
    for item in content.items.by_cost() {
        let unique = if item.unique { " (unique)" } else { "" };
        println!("  {:<20} {:>5}g{}", item.name, item.cost, unique);
    }
}

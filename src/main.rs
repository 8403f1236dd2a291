use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_roster::config::AppConfig;
use shift_roster::display::{
    print_schedule, render_employee_summary, render_shortfalls, write_schedule_to_file,
};
use shift_roster::export::{export_grid_csv, export_report_json, ScheduleReport};
use shift_roster::parser::{build_roster, demo_roster, load_roster_file, RosterEntry};
use shift_roster::schedule::{AssignmentEngine, RandomPreferences};
use shift_roster::web;

#[derive(Parser, Debug)]
#[command(name = "shift-roster", version, about = "Weekly employee shift scheduler")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assign a roster and print the weekly schedule (default)
    Run(RunArgs),
    /// Serve the submit / assign / fetch API
    Web(WebArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Roster file: .csv with a `name` column, otherwise one name per line
    #[arg(long, short)]
    roster: Option<PathBuf>,

    /// Employee name, repeatable; ignored when --roster is given
    #[arg(long = "name", short = 'n')]
    names: Vec<String>,

    /// Seed for preference generation
    #[arg(long)]
    seed: Option<u64>,

    /// Most days an employee may work
    #[arg(long)]
    weekly_cap: Option<usize>,

    /// Per-shift limit during the preference pass
    #[arg(long)]
    soft_cap: Option<usize>,

    /// Staffing target per shift
    #[arg(long)]
    min_staff: Option<usize>,

    /// Also print days worked per employee
    #[arg(long)]
    summary: bool,

    /// Write the text report to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Export the grid as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Export the full run as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct WebArgs {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Web(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            info!(bind = %config.server.bind, port = config.server.port, "starting web server");
            web::start_server(&config).await?;
        }
        Commands::Run(args) => run(args, config)?,
    }
    Ok(())
}

fn run(args: RunArgs, mut config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(cap) = args.weekly_cap {
        config.rules.weekly_day_cap = cap;
    }
    if let Some(cap) = args.soft_cap {
        config.rules.soft_shift_cap = cap;
    }
    if let Some(min) = args.min_staff {
        config.rules.min_staff_per_shift = min;
    }
    config.rules.validate()?;
    let rules = &config.rules;

    let entries = if let Some(path) = &args.roster {
        info!(path = %path.display(), "loading roster");
        load_roster_file(path)?
    } else if !args.names.is_empty() {
        args.names.iter().map(RosterEntry::new).collect()
    } else {
        info!("no roster given, using demo roster");
        demo_roster()
    };

    let preferences = match args.seed.or(config.seed) {
        Some(seed) => RandomPreferences::seeded(seed),
        None => RandomPreferences::from_entropy(),
    };
    let mut roster = build_roster(&entries, rules, preferences)?;

    let engine = AssignmentEngine::new(rules.clone());
    let grid = engine.run(&mut roster);
    let shortfalls = engine.shortfalls(&grid);

    print_schedule(&grid, &rules.days, &rules.shifts);
    let mut sections = vec![render_shortfalls(&shortfalls)];
    if args.summary {
        sections.push(render_employee_summary(&roster, &rules.days));
    }
    for section in &sections {
        println!("\n{}", section.trim_end());
    }

    if let Some(path) = &args.output {
        write_schedule_to_file(&grid, &rules.days, &rules.shifts, &sections, path)?;
        println!("Schedule saved to {}", path.display());
    }
    if let Some(path) = &args.csv {
        export_grid_csv(&grid, &rules.days, &rules.shifts, path)?;
        println!("Grid exported to {}", path.display());
    }
    if let Some(path) = &args.json {
        export_report_json(&ScheduleReport::new(&grid, &roster, rules), path)?;
        println!("Report exported to {}", path.display());
    }
    Ok(())
}

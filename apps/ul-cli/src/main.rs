use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use ul_app::edges::{DISTRIBUTED_STEAM, ELECTRICITY_SUBSTITUTION};
use ul_app::{AppError, AppResult, load_scenario};
use ul_core::units::{to_bar, to_degc};
use ul_export::{DEFAULT_DATABASE, ExportOptions, JsonDatasetStore, export_datasets};
use ul_fluids::CoolPropSteam;
use ul_lca::{
    AllocationBasis, CoProducts, EdgeSet, ImpactCategory, ImpactEngine, ImpactReport, LcaError,
    StaticScoreBackend,
};
use ul_steamnet::{DesignPoint, MainsLadder};

#[derive(Parser)]
#[command(name = "ul-cli")]
#[command(about = "UtilityLCA CLI - steam network life cycle assessment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Show the distribution mains and the selected design point
    Mains {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Allocate background impact over the functional edges of an edge file
    Allocate(AllocateArgs),
    /// Allocate, then write one dataset per functional edge
    Export {
        #[command(flatten)]
        allocation: AllocateArgs,
        /// Directory of the dataset store
        #[arg(short, long)]
        out: PathBuf,
        /// Target database name
        #[arg(long, default_value = DEFAULT_DATABASE)]
        database: String,
        /// Suffix for dataset codes (random when omitted)
        #[arg(long)]
        identifier: Option<String>,
    },
}

#[derive(Args)]
struct AllocateArgs {
    /// Edge set as JSON
    edges_path: PathBuf,
    /// Score table (YAML, or JSON by extension)
    scores_path: PathBuf,
    /// Allocation basis: credit or by_exergy (edges are used as given when omitted)
    #[arg(long, value_parser = parse_basis)]
    basis: Option<AllocationBasis>,
    /// Impact category, repeatable
    #[arg(long = "category", required = true)]
    categories: Vec<String>,
    /// Main functional edge
    #[arg(long, default_value = DISTRIBUTED_STEAM)]
    primary: String,
    /// Co-product edge
    #[arg(long, default_value = ELECTRICITY_SUBSTITUTION)]
    secondary: String,
    /// Share of the primary edge under by_exergy
    #[arg(long, default_value_t = 1.0)]
    share: f64,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_basis(s: &str) -> Result<AllocationBasis, String> {
    match s {
        "credit" => Ok(AllocationBasis::Credit),
        "by_exergy" | "by-exergy" => Ok(AllocationBasis::ByExergy),
        other => Err(format!("unknown basis '{other}' (credit, by_exergy)")),
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Mains { scenario_path } => cmd_mains(&scenario_path),
        Commands::Allocate(args) => cmd_allocate(&args),
        Commands::Export {
            allocation,
            out,
            database,
            identifier,
        } => cmd_export(
            &allocation,
            out,
            ExportOptions {
                database,
                identifier,
            },
        ),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    println!("✓ Scenario is valid: {}", scenario.name);
    if !scenario.sweeps.is_empty() {
        println!("  Sweeps: {}", scenario.sweeps.len());
    }
    Ok(())
}

fn cmd_mains(scenario_path: &Path) -> AppResult<()> {
    let scenario = load_scenario(scenario_path)?;
    let props = CoolPropSteam::new();
    let ladder = MainsLadder::new(&scenario.params.mains_bar)?;

    println!("Distribution mains:");
    for main in ladder.report(&props)? {
        println!(
            "  {:>7.2} bar  T_sat = {:>7.2} °C",
            to_bar(main.pressure),
            to_degc(main.saturation_temperature)
        );
    }

    let design = DesignPoint::compute(&scenario.params, &props)?;
    println!(
        "\nDelivery at {:.1} °C needs {:.2} bar; main {:.2} bar (index {})",
        scenario.params.delivery_temperature_c,
        to_bar(design.needed_pressure),
        to_bar(design.main_pressure()),
        design.main.index
    );
    if !design.main.feasible {
        println!("  ! highest main is too low for this delivery temperature");
    }
    Ok(())
}

fn allocate(args: &AllocateArgs) -> AppResult<(EdgeSet, ImpactReport)> {
    let content = std::fs::read_to_string(&args.edges_path).map_err(LcaError::from)?;
    let edges: EdgeSet = serde_json::from_str(&content).map_err(LcaError::from)?;
    let edges = match args.basis {
        Some(basis) => basis.apply(
            &edges,
            &CoProducts::new(&args.primary, &args.secondary, args.share),
        )?,
        None => edges,
    };

    let backend = StaticScoreBackend::load(&args.scores_path).map_err(|source| {
        AppError::ScoreTable {
            path: args.scores_path.clone(),
            source,
        }
    })?;
    let categories: Vec<ImpactCategory> =
        args.categories.iter().map(ImpactCategory::new).collect();
    let mut engine = ImpactEngine::new(backend);
    info!(
        backend = engine.backend_name(),
        edges = edges.len(),
        categories = categories.len(),
        "computing impact"
    );
    let report = engine.compute(&edges, &categories)?;
    Ok((edges, report))
}

fn cmd_allocate(args: &AllocateArgs) -> AppResult<()> {
    let (_edges, report) = allocate(args)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(LcaError::from)?;
        println!("{json}");
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn cmd_export(args: &AllocateArgs, out: PathBuf, options: ExportOptions) -> AppResult<()> {
    let (edges, report) = allocate(args)?;
    let mut store = JsonDatasetStore::new(out)?;
    let model = args
        .edges_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    let codes = export_datasets(&mut store, model, &edges, &report, &options)?;

    println!(
        "✓ Exported {} dataset(s) to '{}' in {}",
        codes.len(),
        options.database,
        store.root().display()
    );
    for code in codes {
        println!("  {code}");
    }
    Ok(())
}

fn print_report(report: &ImpactReport) {
    for (category, total) in &report.totals {
        println!("{category}");
        println!("  total: {total:.6e}");
        if let Some(per_edge) = report.contributions.get(category) {
            for (edge, value) in per_edge {
                println!("    {edge:<28} {value:>14.6e}");
            }
        }
        if let Some(allocated) = report.allocated.get(category) {
            for (edge, value) in allocated {
                let resolved = report.resolved.get(edge).copied().unwrap_or(f64::NAN);
                println!("  allocated to {edge}: {value:.6e} per unit ({resolved:.6e} units)");
            }
        }
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_names_parse() {
        assert_eq!(parse_basis("credit"), Ok(AllocationBasis::Credit));
        assert_eq!(parse_basis("by_exergy"), Ok(AllocationBasis::ByExergy));
        assert!(parse_basis("mass").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn allocate_demo_edges() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        let args = AllocateArgs {
            edges_path: root.join("edges/steam_200c.json"),
            scores_path: root.join("scenarios/scores.yaml"),
            basis: Some(AllocationBasis::Credit),
            categories: vec!["climate change".to_string()],
            primary: DISTRIBUTED_STEAM.to_string(),
            secondary: ELECTRICITY_SUBSTITUTION.to_string(),
            share: 1.0,
            json: false,
        };
        let (_, report) = allocate(&args).unwrap();
        let cat = ImpactCategory::new("climate change");
        let expected = 0.0712 * 1.3 + 0.1283 * (1.5e4 - 1.2e5) / 3.6e6 + 0.00041 * 0.025;
        let value = report.allocated(&cat, DISTRIBUTED_STEAM).unwrap();
        assert!((value - expected).abs() < 1e-12, "{value} vs {expected}");
    }
}

//! sensor_route — plan a congestion-aware route between two traffic sensors.
//!
//! With no input files the demo runs on an embedded 8-sensor grid with
//! recorded flows at time points 99–101.  Point it at real data with
//! `--nodes`, `--edges`, and `--flows`:
//!
//! ```text
//! sensor_route --nodes sensors.csv --flows flows.csv --source 15 --target 20 --time 100
//! ```
//!
//! Without `--edges`, sensors within `--connect-km` of each other are
//! joined automatically.  Set `RUST_LOG=info` to see planner progress.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;

use fr_core::{GeoPoint, SensorId, TimePoint};
use fr_flow::{FlowOracle, TableOracle};
use fr_network::{EdgeRecord, NodeRecord, load_edges_csv, load_edges_reader, load_nodes_csv, load_nodes_reader, proximity_edges};
use fr_planner::{PlanOutcome, Planner, PlannerConfig};

// ── Embedded sample data ──────────────────────────────────────────────────────

// Two parallel north–south corridors ~1 km apart plus an eastern spur.
const SAMPLE_NODES_CSV: &str = "\
sensor_id,latitude,longitude\n\
15,39.9900,116.3000\n\
18,39.9990,116.3000\n\
20,40.0080,116.3000\n\
23,39.9900,116.3117\n\
27,39.9990,116.3117\n\
31,40.0080,116.3117\n\
34,39.9945,116.3230\n\
40,40.0035,116.3230\n\
";

const SAMPLE_EDGES_CSV: &str = "\
from,to\n\
15,18\n\
18,20\n\
15,23\n\
18,27\n\
20,31\n\
23,27\n\
27,31\n\
23,34\n\
27,34\n\
27,40\n\
31,40\n\
34,40\n\
";

/// Time point used with the embedded flows when none is given.
const SAMPLE_TIME: u32 = 100;

// Wide layout: one row per time point, one column per sensor.
const SAMPLE_FLOWS_CSV: &str = "\
time,15,18,20,23,27,31,34,40\n\
99,8.0,62.0,12.0,6.5,28.0,9.0,4.0,5.5\n\
100,9.5,85.0,14.0,7.0,40.0,11.0,4.5,6.0\n\
101,7.0,48.0,10.5,6.0,22.0,8.5,3.5,5.0\n\
";

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sensor_route")]
#[command(version, about = "Congestion-aware route planning between traffic sensors", long_about = None)]
struct Cli {
    /// Sensor CSV (sensor_id,latitude,longitude).  Embedded sample if omitted.
    #[arg(long)]
    nodes: Option<PathBuf>,

    /// Edge CSV (from,to).  Generated from --connect-km if omitted.
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Wide flow CSV (time,<sensor>,<sensor>,...).  Embedded sample if omitted.
    #[arg(long)]
    flows: Option<PathBuf>,

    /// Prediction service endpoint, used instead of --flows.
    #[cfg(feature = "http")]
    #[arg(long, conflicts_with = "flows")]
    oracle_url: Option<String>,

    /// JSON planner config; fields not given keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source sensor id.
    #[arg(long, default_value_t = 15)]
    source: u32,

    /// Target sensor id.
    #[arg(long, default_value_t = 31)]
    target: u32,

    /// Reference time point.  Defaults to the config's reference_time.
    #[arg(long)]
    time: Option<u32>,

    /// Congestion sensitivity.  Defaults to the config's alpha.
    #[arg(long)]
    alpha: Option<f64>,

    /// Join sensors closer than this when no edge file is given.
    #[arg(long, default_value_t = 2.0)]
    connect_km: f64,

    /// Snap the source to the sensor nearest "LAT,LON" instead of --source.
    #[arg(long, value_parser = parse_coord)]
    near: Option<GeoPoint>,

    /// Rayon worker threads for edge scoring.  All cores if omitted.
    #[arg(long)]
    threads: Option<usize>,

    /// Print the route as JSON instead of a leg table.
    #[arg(long)]
    json: bool,
}

fn parse_coord(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s.split_once(',').ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude {lat:?}"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("bad longitude {lon:?}"))?;
    GeoPoint::validated(lat, lon).map_err(|e| e.to_string())
}

// ── Input assembly ────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<PlannerConfig> {
    let Some(path) = &cli.config else {
        return Ok(PlannerConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: PlannerConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn load_network(cli: &Cli) -> Result<(Vec<NodeRecord>, Vec<EdgeRecord>)> {
    let nodes = match &cli.nodes {
        Some(path) => load_nodes_csv(path).with_context(|| format!("loading {}", path.display()))?,
        None => load_nodes_reader(Cursor::new(SAMPLE_NODES_CSV))?,
    };

    let edges = match (&cli.edges, &cli.nodes) {
        (Some(path), _) => load_edges_csv(path).with_context(|| format!("loading {}", path.display()))?,
        (None, None) => load_edges_reader(Cursor::new(SAMPLE_EDGES_CSV))?,
        (None, Some(_)) => {
            let edges = proximity_edges(&nodes, cli.connect_km);
            log::info!("generated {} edges within {} km", edges.len(), cli.connect_km);
            edges
        }
    };
    Ok((nodes, edges))
}

fn load_oracle(cli: &Cli, timeout_ms: Option<u64>) -> Result<Arc<dyn FlowOracle>> {
    #[cfg(feature = "http")]
    {
        if let Some(url) = &cli.oracle_url {
            let timeout = std::time::Duration::from_millis(timeout_ms.unwrap_or(5_000));
            return Ok(Arc::new(fr_flow::HttpOracle::new(url.clone(), timeout)?));
        }
    }
    #[cfg(not(feature = "http"))]
    let _ = timeout_ms;

    let table = match &cli.flows {
        Some(path) => TableOracle::from_wide_csv(path).with_context(|| format!("loading {}", path.display()))?,
        None => TableOracle::from_wide_reader(Cursor::new(SAMPLE_FLOWS_CSV))?,
    };
    Ok(Arc::new(table))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring the rayon thread pool")?;
    }

    let mut config = load_config(&cli)?;
    let time = match (cli.time, &cli.config, &cli.flows) {
        (Some(t), _, _) => TimePoint(t),
        (None, None, None) => TimePoint(SAMPLE_TIME),
        (None, _, _) => config.reference_time,
    };
    config.reference_time = time;

    let (nodes, edges) = load_network(&cli)?;
    let oracle = load_oracle(&cli, config.oracle_timeout_ms)?;

    let source = match cli.near {
        Some(pos) => {
            let graph = fr_network::SensorGraph::from_records(&nodes, &edges)?;
            let Some(snapped) = graph.nearest_sensor(pos) else {
                bail!("no sensors loaded, cannot snap to ({}, {})", pos.lat, pos.lon);
            };
            log::info!("snapped ({}, {}) to sensor {snapped}", pos.lat, pos.lon);
            snapped
        }
        None => SensorId(cli.source),
    };
    let target = SensorId(cli.target);

    let planner = Planner::new(config, oracle);
    let t0 = Instant::now();
    let (outcome, report) = planner.plan_route_with_report(&nodes, &edges, source, target, time, cli.alpha)?;
    let elapsed = t0.elapsed();

    match (&outcome, report) {
        (PlanOutcome::Found(path), Some(report)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(path)?);
            } else {
                println!("{} sensors, {} edges, planned in {:.3} ms", nodes.len(), edges.len(), elapsed.as_secs_f64() * 1e3);
                println!();
                print!("{report}");
                if let Some(worst) = report.worst_leg() {
                    println!();
                    println!("busiest leg: {} → {} ({}, flow {:.1})", worst.from, worst.to, worst.level, worst.avg_flow);
                }
            }
        }
        (PlanOutcome::NoPath { source, target }, _) => {
            if cli.json {
                println!("{}", serde_json::json!({ "path": null, "source": source, "target": target }));
            } else {
                println!("no route from sensor {source} to sensor {target}");
            }
        }
        (PlanOutcome::Found(_), None) => bail!("planner returned a route without a report"),
    }

    Ok(())
}

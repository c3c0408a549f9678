//! twolyp-hub CLI: snapshot, metrics, watch, report, verify.

use clap::{Parser, Subcommand};
use twolyp_hub::bundle::{reproducibility_hash, MetricsBundle, VerificationResult};
use twolyp_hub::chain::{Cache, RpcClient, RpcConfig};
use twolyp_hub::compute::{compute_metrics, ComputeInput};
use twolyp_hub::report::ReportData;
use twolyp_hub::token::{RawSnapshot, SupplyHistory, SupplySample, TokenReader};
use twolyp_hub_report::render_report;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Snapshot(args) => run_snapshot(args),
        Command::Metrics(args) => run_metrics(args),
        Command::Watch(args) => run_watch(args),
        Command::Report(args) => run_report(args),
        Command::Verify(args) => run_verify(args),
    }
}

#[derive(Parser)]
#[command(name = "twolyp-hub")]
#[command(about = "Derived on-chain metrics for the 2LYP token hub")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Take one raw contract snapshot and print it as JSON.
    Snapshot(SnapshotArgs),
    /// Snapshot, derive all metrics, and write a bundle + hash.
    Metrics(MetricsArgs),
    /// Poll on an interval, accumulating supply history.
    Watch(WatchArgs),
    /// Generate HTML report and bundle.
    Report(ReportArgs),
    /// Verify a bundle's reproducibility hash.
    Verify(VerifyArgs),
}

#[derive(Parser)]
struct SnapshotArgs {
    #[arg(long, env = "TWOLYP_CONTRACT")]
    contract: String,
    #[arg(long, env = "TWOLYP_RPC_URL")]
    rpc_url: Option<String>,
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,
    #[arg(long, default_value = "./data/history.json")]
    history_file: PathBuf,
    #[arg(long)]
    offline: bool,
}

#[derive(Parser)]
struct MetricsArgs {
    #[arg(long, env = "TWOLYP_CONTRACT")]
    contract: String,
    #[arg(long, env = "TWOLYP_RPC_URL")]
    rpc_url: Option<String>,
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,
    #[arg(long, default_value = "./data/history.json")]
    history_file: PathBuf,
    #[arg(long, default_value = "./reports")]
    reports_dir: PathBuf,
    #[arg(long)]
    offline: bool,
}

#[derive(Parser)]
struct WatchArgs {
    #[arg(long, env = "TWOLYP_CONTRACT")]
    contract: String,
    #[arg(long, env = "TWOLYP_RPC_URL")]
    rpc_url: Option<String>,
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,
    #[arg(long, default_value = "./data/history.json")]
    history_file: PathBuf,
    #[arg(long, default_value_t = 30)]
    interval_secs: u64,
    /// Stop after this many polls (runs until interrupted when omitted).
    #[arg(long)]
    count: Option<u64>,
}

#[derive(Parser)]
struct ReportArgs {
    #[arg(long, env = "TWOLYP_CONTRACT", required_unless_present = "demo")]
    contract: Option<String>,
    #[arg(long, env = "TWOLYP_RPC_URL")]
    rpc_url: Option<String>,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, default_value = "./reports")]
    reports_dir: PathBuf,
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,
    #[arg(long, default_value = "./data/history.json")]
    history_file: PathBuf,
    #[arg(long)]
    offline: bool,
    /// Generate a demo report with example metrics.
    #[arg(long)]
    demo: bool,
}

#[derive(Parser)]
struct VerifyArgs {
    #[arg(long)]
    bundle: PathBuf,
}

fn cache_path(cache_dir: &std::path::Path) -> PathBuf {
    cache_dir.join("cache.sqlite")
}

fn rpc_client(
    rpc_url: Option<String>,
    cache_dir: &std::path::Path,
    offline: bool,
) -> Result<RpcClient, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(cache_dir)?;
    let cache = Cache::open(cache_path(cache_dir))?;
    let mut config = RpcConfig {
        offline,
        ..Default::default()
    };
    if let Some(url) = rpc_url {
        config.rpc_url = url;
    }
    Ok(RpcClient::new(config, Some(cache))?)
}

fn load_history(path: &std::path::Path) -> SupplyHistory {
    match std::fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "unreadable history, starting fresh");
            SupplyHistory::new()
        }),
        Err(_) => SupplyHistory::new(),
    }
}

fn save_history(
    path: &std::path::Path,
    history: &SupplyHistory,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(history)?)?;
    Ok(())
}

/// Fold a snapshot into the history when its supply and block resolved.
fn record_sample(history: &mut SupplyHistory, snapshot: &RawSnapshot) {
    let (Some(&supply), Some(&block)) = (
        snapshot.total_supply.ready(),
        snapshot.block_number.ready(),
    ) else {
        warn!("snapshot incomplete, not recorded in history");
        return;
    };
    let metrics = compute_metrics(&ComputeInput {
        snapshot: snapshot.clone(),
        history: SupplyHistory::new(),
        model: Default::default(),
    });
    history.record(SupplySample {
        block,
        timestamp_ms: snapshot.observed_at_ms,
        supply,
        circulating: metrics.distribution.circulating_supply,
    });
}

fn take_snapshot(
    rpc: &RpcClient,
    contract: &str,
) -> Result<RawSnapshot, Box<dyn std::error::Error>> {
    let reader = TokenReader::new(rpc, contract);
    let rt = tokio::runtime::Runtime::new()?;
    let snapshot = rt.block_on(reader.snapshot());
    info!(requests = rpc.request_count(), "snapshot collected");
    Ok(snapshot)
}

fn build_bundle(
    contract: &str,
    snapshot: RawSnapshot,
    history: &SupplyHistory,
) -> MetricsBundle {
    let input = ComputeInput {
        snapshot,
        history: history.clone(),
        model: Default::default(),
    };
    let metrics = compute_metrics(&input);
    let samples = history.iter().copied().collect();
    MetricsBundle::new(contract.to_string(), input.snapshot, metrics, samples)
}

fn contract_suffix(contract: &str) -> String {
    contract
        .chars()
        .take(20)
        .collect::<String>()
        .replace([' ', ':'], "_")
}

fn run_snapshot(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rpc = rpc_client(args.rpc_url, &args.cache_dir, args.offline)?;
    let snapshot = take_snapshot(&rpc, &args.contract)?;
    let mut history = load_history(&args.history_file);
    record_sample(&mut history, &snapshot);
    save_history(&args.history_file, &history)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_metrics(args: MetricsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rpc = rpc_client(args.rpc_url, &args.cache_dir, args.offline)?;
    let snapshot = take_snapshot(&rpc, &args.contract)?;
    let mut history = load_history(&args.history_file);
    record_sample(&mut history, &snapshot);
    save_history(&args.history_file, &history)?;

    let bundle = build_bundle(&args.contract, snapshot, &history);
    let hash = reproducibility_hash(&bundle)?;
    std::fs::create_dir_all(&args.reports_dir)?;
    let suffix = contract_suffix(&args.contract);
    let bundle_path = args.reports_dir.join(format!("{suffix}.bundle.json"));
    let hash_path = args.reports_dir.join(format!("{suffix}.sha256"));
    std::fs::write(&bundle_path, serde_json::to_string_pretty(&bundle)?)?;
    std::fs::write(&hash_path, format!("{hash}\n"))?;
    info!(?bundle_path, ?hash_path, "metrics complete");
    println!("{hash}");
    Ok(())
}

fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rpc = rpc_client(args.rpc_url, &args.cache_dir, false)?;
    let reader = TokenReader::new(&rpc, &args.contract);
    let rt = tokio::runtime::Runtime::new()?;
    let mut history = load_history(&args.history_file);
    let mut polls = 0u64;
    loop {
        let snapshot = rt.block_on(reader.snapshot());
        record_sample(&mut history, &snapshot);
        save_history(&args.history_file, &history)?;
        let metrics = compute_metrics(&ComputeInput {
            snapshot,
            history: history.clone(),
            model: Default::default(),
        });
        info!(
            supply = metrics.supply.total,
            circulating = metrics.distribution.circulating_supply,
            security = metrics.health.security.score,
            overall = metrics.health.overall.score,
            rate_24h = metrics.growth.rates.last_24h,
            samples = history.len(),
            "poll"
        );
        polls += 1;
        if args.count.is_some_and(|c| polls >= c) {
            break;
        }
        rt.block_on(tokio::time::sleep(Duration::from_secs(args.interval_secs)));
    }
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.demo {
        return run_report_demo(&args);
    }
    // required_unless_present guarantees the contract here.
    let contract = args.contract.clone().unwrap_or_default();
    let rpc = rpc_client(args.rpc_url, &args.cache_dir, args.offline)?;
    let snapshot = take_snapshot(&rpc, &contract)?;
    let mut history = load_history(&args.history_file);
    record_sample(&mut history, &snapshot);
    save_history(&args.history_file, &history)?;

    let bundle = build_bundle(&contract, snapshot, &history);
    let reproducibility_hash_sha256 = reproducibility_hash(&bundle)?;
    let data = ReportData {
        bundle,
        reproducibility_hash_sha256: reproducibility_hash_sha256.clone(),
    };
    std::fs::create_dir_all(&args.reports_dir)?;
    let suffix = contract_suffix(&contract);
    let html_path = args
        .out
        .unwrap_or_else(|| args.reports_dir.join(format!("{suffix}.html")));
    let bundle_path = args.reports_dir.join(format!("{suffix}.bundle.json"));
    let hash_path = args.reports_dir.join(format!("{suffix}.sha256"));
    render_report(&data, &html_path)?;
    std::fs::write(&bundle_path, serde_json::to_string_pretty(&data.bundle)?)?;
    std::fs::write(&hash_path, format!("{reproducibility_hash_sha256}\n"))?;
    info!(?html_path, ?bundle_path, ?hash_path, "report complete");
    Ok(())
}

fn run_report_demo(args: &ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = MetricsBundle::demo();
    let reproducibility_hash_sha256 = reproducibility_hash(&bundle)?;
    let data = ReportData {
        bundle,
        reproducibility_hash_sha256: reproducibility_hash_sha256.clone(),
    };
    std::fs::create_dir_all(&args.reports_dir)?;
    let html_path = args
        .out
        .clone()
        .unwrap_or_else(|| args.reports_dir.join("demo.html"));
    let bundle_path = args.reports_dir.join("demo.bundle.json");
    let hash_path = args.reports_dir.join("demo.sha256");
    render_report(&data, &html_path)?;
    std::fs::write(&bundle_path, serde_json::to_string_pretty(&data.bundle)?)?;
    std::fs::write(&hash_path, format!("{reproducibility_hash_sha256}\n"))?;
    info!(?html_path, ?bundle_path, ?hash_path, "demo report complete");
    println!("Demo report written to {}", html_path.display());
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bundle_json = std::fs::read_to_string(&args.bundle)?;
    let bundle: MetricsBundle = serde_json::from_str(&bundle_json)?;
    let computed = reproducibility_hash(&bundle)?;
    // foo.bundle.json sits next to foo.sha256
    let stem = args
        .bundle
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .trim_end_matches(".bundle")
        .to_string();
    let sha256_path = args
        .bundle
        .parent()
        .unwrap_or(std::path::Path::new("."))
        .join(format!("{stem}.sha256"));
    let expected = std::fs::read_to_string(sha256_path)
        .ok()
        .map(|s| s.trim().to_string());
    let result = if let Some(ref exp) = expected {
        VerificationResult {
            bundle_hash: computed.clone(),
            expected_hash: Some(exp.clone()),
            matches: computed.to_lowercase() == exp.to_lowercase(),
        }
    } else {
        VerificationResult {
            bundle_hash: computed.clone(),
            expected_hash: None,
            matches: false,
        }
    };
    if result.matches {
        println!("OK\t{}", result.bundle_hash);
    } else {
        eprintln!(
            "MISMATCH\tcomputed={}\texpected={:?}",
            result.bundle_hash, result.expected_hash
        );
        std::process::exit(1);
    }
    Ok(())
}

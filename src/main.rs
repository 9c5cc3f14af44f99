use anyhow::Result;
use clap::Parser;

use cleanerd::cli::{Cli, Commands};
use cleanerd::liveness::{
    FilesystemSummary, FixedCheckpointOracle, ProtectionCheckpoint, SegmentUsage,
    SimulatedLivenessProbe,
};
use cleanerd::logging::EventLog;
use cleanerd::metrics::Metrics;
use cleanerd::{run_cycle, EngineConfig, PolicyRegistry};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { policy, nsegments } => cmd_run(&cli.config_preset, &policy, nsegments, cli.json),
        Commands::ListPolicies => cmd_list_policies(cli.json),
        Commands::ShowConfig => cmd_show_config(&cli.config_preset, cli.json),
    }
}

fn load_config(preset: &str) -> EngineConfig {
    match preset {
        "testing" => EngineConfig::testing(),
        _ => EngineConfig::production(),
    }
}

/// Builds a deterministic synthetic workload: segment ages fan out
/// linearly from "just written" to "very old", and fill levels cycle
/// through a fixed pattern, enough to exercise every built-in policy's
/// eligibility rules without pulling in a real filesystem backend.
fn synthetic_suinfo(nsegments: u32, now: i64) -> Vec<SegmentUsage> {
    (0..nsegments)
        .map(|i| {
            let age = (i as i64 + 1) * 3600;
            let fill_pct = [5u32, 20, 40, 65, 85][(i as usize) % 5];
            SegmentUsage {
                lastmod: now - age,
                nblocks: fill_pct,
                reclaimable: i % 7 != 0,
            }
        })
        .collect()
}

fn cmd_run(preset: &str, policy_name: &str, nsegments: u32, json: bool) -> Result<()> {
    let config = load_config(preset);
    let registry = PolicyRegistry::with_builtins();
    let now = 10_000_000i64;
    let prottime = now - config.protection_interval_secs;
    let sustat = FilesystemSummary {
        blocks_per_segment: 100,
        nongc_ctime: now,
    };
    let suinfo = synthetic_suinfo(nsegments, now);
    let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
    let probe = SimulatedLivenessProbe;
    let metrics = Metrics::new();
    let mut log = EventLog::new(64);

    let outcome = run_cycle(
        &registry,
        policy_name,
        &sustat,
        &suinfo,
        now,
        prottime,
        &oracle,
        &probe,
        config.nsegments_per_clean_max,
        &metrics,
        &mut log,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "policy": outcome.policy_name,
            "segnums": outcome.segnums,
            "oldest": outcome.oldest,
            "evaluated": outcome.stats.evaluated,
            "selected": outcome.stats.selected,
        }))?);
    } else {
        println!("policy: {}", outcome.policy_name);
        println!("selected segments: {:?}", outcome.segnums);
        println!("oldest lastmod among selected: {:?}", outcome.oldest);
        println!(
            "evaluated={} selected={} skipped_clean={} skipped_protected={} skipped_not_reclaimable={} skipped_error={} skipped_utilization_cap={}",
            outcome.stats.evaluated,
            outcome.stats.selected,
            outcome.stats.skipped_clean,
            outcome.stats.skipped_protected,
            outcome.stats.skipped_not_reclaimable,
            outcome.stats.skipped_error,
            outcome.stats.skipped_utilization_cap,
        );
        for event in log.get_events() {
            println!("{}", event.to_text());
        }
    }

    Ok(())
}

fn cmd_list_policies(json: bool) -> Result<()> {
    let registry = PolicyRegistry::with_builtins();
    let names = registry.names();
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn cmd_show_config(preset: &str, _json: bool) -> Result<()> {
    let config = load_config(preset);
    println!("{}", config.to_json());
    Ok(())
}

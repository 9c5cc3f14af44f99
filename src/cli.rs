use clap::{Parser, Subcommand};

/// Segment-reclamation policy engine for a log-structured filesystem
/// cleaner.
#[derive(Parser, Debug)]
#[command(name = "cleanerd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration preset to load ("production" or "testing").
    #[arg(long, global = true, default_value = "production")]
    pub config_preset: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one cleaning cycle against a synthetic workload and print the
    /// resulting selection.
    Run {
        /// Policy to use: timestamp, greedy, cost-benefit, segregation.
        #[arg(long, default_value = "timestamp")]
        policy: String,
        /// Number of synthetic segments to generate.
        #[arg(long, default_value_t = 16)]
        nsegments: u32,
    },
    /// List the policies registered in the built-in registry.
    ListPolicies,
    /// Print the effective engine configuration as JSON.
    ShowConfig,
}

//! HTAP CLI - Command Line Interface
//!
//! Terminal console for the HTAP dashboard. Runs queries against the
//! simulator or the live gateway, probes credentials, prints cluster
//! gauges and generated insights, and follows the refresh loop.
//!
//! Settings come from flags or their environment fallbacks; nothing is
//! read from or written to disk.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use clap::{Args, Parser, Subcommand};
use htap_client::{
    ClusterStatus, ConnectionConfig, Dashboard, DashboardConfig, DashboardState, Insight,
    InsightClient, InsightConfig, MetricGenerator, QueryConsole, QueryResult, ReqwestTransport,
    SimulatorConfig,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "htap")]
#[command(author = "AutomataNexus Development Team")]
#[command(version = "0.1.0")]
#[command(about = "HTAP cluster dashboard console", long_about = None)]
struct Cli {
    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(flatten)]
    insight: InsightArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GatewayArgs {
    /// Query gateway endpoint URL
    #[arg(long, global = true, default_value = "", env = "HTAP_ENDPOINT")]
    endpoint: String,

    /// Gateway public key
    #[arg(long, global = true, default_value = "", env = "HTAP_PUBLIC_KEY")]
    public_key: String,

    /// Gateway private key
    #[arg(long, global = true, default_value = "", env = "HTAP_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// SQL client host shown in the connection hint
    #[arg(long, global = true, env = "HTAP_SQL_HOST")]
    sql_host: Option<String>,

    /// SQL client port shown in the connection hint
    #[arg(long, global = true, env = "HTAP_SQL_PORT")]
    sql_port: Option<String>,

    /// SQL client user shown in the connection hint
    #[arg(long, global = true, env = "HTAP_SQL_USER")]
    sql_user: Option<String>,
}

#[derive(Args)]
struct InsightArgs {
    /// API key for the insight endpoint
    #[arg(long, global = true, default_value = "", env = "HTAP_INSIGHT_API_KEY", hide_env_values = true)]
    insight_api_key: String,

    /// Base URL of the insight endpoint
    #[arg(long, global = true, env = "HTAP_INSIGHT_ENDPOINT")]
    insight_endpoint: Option<String>,

    /// Model used for insights
    #[arg(long, global = true, env = "HTAP_INSIGHT_MODEL")]
    insight_model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a SQL query
    Query {
        sql: String,
        /// Send the query to the live gateway instead of the simulator
        #[arg(long, env = "HTAP_LIVE", value_parser = clap::builder::FalseyValueParser::new())]
        live: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check gateway connectivity and credentials
    TestConnection,
    /// Show a cluster status snapshot
    Status,
    /// Generate an insight for a fresh status snapshot
    Insights,
    /// Follow the dashboard refresh loop
    Watch {
        #[arg(long, default_value = "2000")]
        interval_ms: u64,
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },
}

impl GatewayArgs {
    fn to_config(&self, is_live: bool) -> ConnectionConfig {
        ConnectionConfig::new(&self.endpoint, &self.public_key, &self.private_key)
            .with_live(is_live)
            .with_sql_client(self.sql_host.clone(), self.sql_port.clone(), self.sql_user.clone())
    }
}

impl InsightArgs {
    fn to_config(&self) -> InsightConfig {
        let mut config = InsightConfig::new(&self.insight_api_key);
        if let Some(ref endpoint) = self.insight_endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(ref model) = self.insight_model {
            config = config.with_model(model);
        }
        config
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let transport = Arc::new(ReqwestTransport::new());

    match cli.command {
        Commands::Query { sql, live, json } => {
            let config = cli.gateway.to_config(live);
            let console = QueryConsole::new(transport, SimulatorConfig::default());
            let result = console.run(&config, &sql).await;

            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_result(&result);
            }

            if result.is_error() {
                return ExitCode::FAILURE;
            }
        }
        Commands::TestConnection => {
            let config = cli.gateway.to_config(true);
            let console = QueryConsole::new(transport, SimulatorConfig::default());
            let check = console.test_connection(&config).await;

            println!("{}", check.message);
            if let Some(hint) = config.cli_hint() {
                println!("Connect with: {}", hint);
            }
            if !check.success {
                return ExitCode::FAILURE;
            }
        }
        Commands::Status => {
            print_status(&MetricGenerator::new().cluster_status());
        }
        Commands::Insights => {
            let status = MetricGenerator::new().cluster_status();
            let client = InsightClient::new(transport, cli.insight.to_config());
            print_status(&status);
            println!();
            print_insight(&client.get_insights(&status).await);
        }
        Commands::Watch { interval_ms, ticks } => {
            let config =
                DashboardConfig::default().with_refresh_interval(Duration::from_millis(interval_ms));
            match Dashboard::new(config) {
                Ok(dashboard) => watch(dashboard, ticks).await,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

async fn watch(dashboard: Dashboard, ticks: Option<u64>) {
    let mut rx = dashboard.subscribe();
    let handle = dashboard.spawn_refresh();

    print_snapshot(&rx.borrow_and_update());

    let mut seen = 0u64;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print_snapshot(&rx.borrow_and_update());
                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping refresh loop");
                break;
            }
        }
    }

    handle.abort();
}

// =============================================================================
// Output
// =============================================================================

fn print_status(status: &ClusterStatus) {
    println!("Regions:          {}", status.region_count);
    println!("Replicas:         {}", status.replica_count);
    println!("Sync lag:         {:.1} ms", status.sync_lag_ms);
    println!("Transactional:    {:.0} QPS", status.tp_qps);
    println!("Analytical:       {:.0} QPS", status.ap_qps);
}

fn print_insight(insight: &Insight) {
    println!("[{}] {}", insight.severity, insight.title);
    println!("{}", insight.content);
    println!("Recommendation: {}", insight.recommendation);
}

fn print_snapshot(state: &DashboardState) {
    let status = state.status();
    let latest = state.series().last();
    println!(
        "{}  regions={} replicas={} lag={:.1}ms tp={:.0}qps ap={:.0}qps cpu={}",
        state.refreshed_at().format("%H:%M:%S"),
        status.region_count,
        status.replica_count,
        status.sync_lag_ms,
        status.tp_qps,
        status.ap_qps,
        latest
            .map(|p| format!("{:.0}%", p.cpu_percent))
            .unwrap_or_else(|| "-".to_string()),
    );
}

fn print_result(result: &QueryResult) {
    if let Some(error) = result.error() {
        eprintln!("Error: {}", error);
        return;
    }

    let columns = result.columns();
    let cells: Vec<Vec<String>> = result
        .rows()
        .iter()
        .map(|row| {
            // Rows are laid out in column order.
            (0..columns.len())
                .map(|i| row.get(i).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", render(columns));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &cells {
        println!("{}", render(row.as_slice()));
    }

    println!();
    println!(
        "{} rows in {:.1} ms on {} engine (MPP: {})",
        result.row_count(),
        result.execution_time_ms(),
        result.engine(),
        if result.is_mpp() { "yes" } else { "no" }
    );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parsed_live(args: &[&str]) -> bool {
        let cli = Cli::try_parse_from(args).expect("arguments parse");
        match cli.command {
            Commands::Query { live, .. } => live,
            _ => panic!("expected the query subcommand"),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    // Env-dependent cases share one test so nothing races on HTAP_LIVE.
    #[test]
    fn test_live_flag_env_fallback() {
        std::env::set_var("HTAP_LIVE", "1");
        assert!(parsed_live(&["htap", "query", "SELECT 1"]));

        std::env::set_var("HTAP_LIVE", "yes");
        assert!(parsed_live(&["htap", "query", "SELECT 1"]));

        std::env::set_var("HTAP_LIVE", "0");
        assert!(!parsed_live(&["htap", "query", "SELECT 1"]));

        std::env::set_var("HTAP_LIVE", "false");
        assert!(!parsed_live(&["htap", "query", "SELECT 1"]));

        std::env::remove_var("HTAP_LIVE");
        assert!(!parsed_live(&["htap", "query", "SELECT 1"]));
        assert!(parsed_live(&["htap", "query", "--live", "SELECT 1"]));
    }

    #[test]
    fn test_watch_rejects_zero_interval() {
        let config = DashboardConfig::default().with_refresh_interval(Duration::from_millis(0));
        assert!(Dashboard::new(config).is_err());
    }
}

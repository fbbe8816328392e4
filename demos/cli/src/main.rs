use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use vitals_core::{EngineConfig, RiskInsight};
use vitals_risk::{
    analyze_snapshot_str, ingest, urgent_insights, HealthProfile, InsightStore,
    MemoryInsightStore, VitalsSimulator,
};

#[derive(Parser, Debug)]
#[command(
    name = "vitals-cli",
    about = "Đánh giá nguy cơ sức khỏe từ chỉ số sống."
)]
struct Args {
    /// File JSON cấu hình engine (mặc định nếu bỏ trống).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chấm điểm một snapshot JSON.
    Score {
        /// Đường dẫn tới file JSON snapshot.
        #[arg(short, long)]
        input: PathBuf,
        /// In kết quả dạng JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sinh chỉ số giả lập và chạy qua pipeline.
    Simulate {
        #[arg(short, long, default_value = "demo-subject")]
        subject: String,
        #[arg(short, long, default_value = "healthy")]
        profile: HealthProfile,
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// Seed cố định để tái lập kết quả.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Score { input, json } => score(&input, json, &config),
        Command::Simulate {
            subject,
            profile,
            count,
            seed,
        } => simulate(&subject, profile, count, seed, &config),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Cấu hình không hợp lệ {:?}", path))
}

fn score(input: &PathBuf, json: bool, config: &EngineConfig) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Không đọc được file {:?}", input))?;

    let insights = analyze_snapshot_str(&data, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.is_empty() {
        println!("No condition could be evaluated from this snapshot.");
        return Ok(());
    }

    for insight in &insights {
        print_insight(insight);
    }

    let urgent = urgent_insights(&insights, config);
    println!("Urgent alerts: {}", urgent.len());
    for insight in urgent {
        println!("  ! {}: {}", insight.condition, insight.recommendation);
    }

    Ok(())
}

fn simulate(
    subject: &str,
    profile: HealthProfile,
    count: usize,
    seed: Option<u64>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let simulator = VitalsSimulator::new(profile);
    let store = MemoryInsightStore::new();

    tracing::info!(subject, %profile, count, "Starting vitals simulation");

    let mut alert_count = 0;
    for mut snapshot in simulator.generate_series(subject, count, &mut rng) {
        snapshot.recorded_at = Some(Utc::now());
        let assessment = ingest(&snapshot, &store, config)?;
        for message in assessment.alert_messages() {
            println!("ALERT {message}");
        }
        alert_count += assessment.alerts.len();
    }

    println!(
        "Readings: {count}\nStored insights: {}\nUrgent alerts: {alert_count}",
        store.insights_for(subject, None)?.len()
    );
    println!("Latest per condition:");
    for insight in store.latest_by_condition(subject)? {
        print_insight(&insight);
    }

    Ok(())
}

fn print_insight(insight: &RiskInsight) {
    println!(
        "[{}] {} severity={} ({})",
        insight.risk_tier,
        insight.condition,
        insight.severity,
        insight.factors.join(", ")
    );
    println!("    {}", insight.recommendation);
}

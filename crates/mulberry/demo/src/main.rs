//! Reference settlement run for the Mulberry cooperative.
//!
//! Registers three agents, logs their contributions and splits a
//! ₩1,000,000 payout across them:
//!
//! 1. **Contributions**: marketing score, work hours and revenue per agent
//! 2. **Settlement**: weighted split (45% / 30% / 25% by default)
//! 3. **Audit**: per-category breakdown, ledger replay, cooperative stats
//!
//! Usage: `mulberry-dividend-demo [config.toml] [--json]`

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use mulberry_dividend::{
    AllocatorConfig, ContributionCategory, CooperativeRole, DividendAllocator, InMemoryMemberStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Mulberry settlement demo
#[derive(Parser, Debug)]
#[command(name = "mulberry-dividend-demo")]
#[command(about = "Run the reference Mulberry dividend settlement", long_about = None)]
#[command(version)]
struct Args {
    /// Allocator configuration file (TOML); defaults apply when omitted
    config: Option<PathBuf>,

    /// Print the committed distribution as JSON
    #[arg(long)]
    json: bool,
}

fn won(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("₩{}{}", sign, grouped)
}

fn header(title: &str) {
    println!();
    println!("{}", "═".repeat(64).cyan());
    println!("  {}", title.cyan().bold());
    println!("{}", "═".repeat(64).cyan());
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AllocatorConfig::load(path)
            .with_context(|| format!("loading allocator config from {}", path.display()))?,
        None => AllocatorConfig::default(),
    };

    let mut coop = DividendAllocator::new(InMemoryMemberStore::new(), config)?;

    // ── Part 1: Members and contributions ──────────────────────────────
    header("Part 1: Contributions");

    let sns = coop.register_member("SNS_Manager", CooperativeRole::Marketer)?;
    let sales = coop.register_member("Sales_Agent", CooperativeRole::RevenueGenerator)?;
    let inventory = coop.register_member("Inventory_Manager", CooperativeRole::Worker)?;

    coop.record_contribution(
        &sns.id,
        ContributionCategory::Marketing,
        100.0,
        "10 Mastodon posts, reach 2,500",
    )?;
    coop.record_contribution(
        &sns.id,
        ContributionCategory::WorkHours,
        8.0,
        "SNS management and content production",
    )?;
    coop.record_contribution(
        &sales.id,
        ContributionCategory::Revenue,
        5_000_000.0,
        "180 orders, ₩5,000,000 revenue",
    )?;
    coop.record_contribution(
        &sales.id,
        ContributionCategory::WorkHours,
        12.0,
        "order handling and customer support",
    )?;
    coop.record_contribution(
        &inventory.id,
        ContributionCategory::WorkHours,
        10.0,
        "inventory management and optimisation",
    )?;

    // ── Part 2: Settlement ─────────────────────────────────────────────
    header("Part 2: Settlement");

    let distribution = coop.calculate_dividends(1_000_000.0, None, None)?;
    info!(distribution = %distribution.id, "Settlement committed");

    for member in [&sns, &sales, &inventory] {
        let amount = distribution.dividend_for(&member.id).unwrap_or(0.0);
        println!(
            "  {:<20} {}",
            member.agent_name,
            won(amount).green().bold()
        );
    }

    // ── Part 3: Audit ──────────────────────────────────────────────────
    header("Part 3: Breakdown");

    let weights = *coop.weights();
    for member in [&sns, &sales, &inventory] {
        let Some(breakdown) = distribution.breakdown.get(&member.id) else {
            continue;
        };
        println!("  {}", member.agent_name.bold());
        println!(
            "    marketing  ({:>2.0}%): {}",
            weights.marketing * 100.0,
            won(breakdown.marketing_share)
        );
        println!(
            "    work hours ({:>2.0}%): {}",
            weights.work_hours * 100.0,
            won(breakdown.work_share)
        );
        println!(
            "    revenue    ({:>2.0}%): {}",
            weights.revenue * 100.0,
            won(breakdown.revenue_share)
        );
        println!("    total        : {}", won(breakdown.total()).yellow());
    }

    coop.verify_ledger()?;
    println!();
    println!("  {} ledger replay matches cached aggregates", "[OK]".green());

    header("Cooperative stats");
    let stats = coop.cooperative_stats()?;
    println!("  members        : {} ({} active)", stats.total_members, stats.active_members);
    println!("  contributions  : {}", stats.total_contributions_logged);
    println!("  distributed    : {}", won(stats.total_dividends_distributed));
    for summary in &stats.recent_distributions {
        println!(
            "  {}  {}  {}",
            summary.id,
            summary.period_label().dimmed(),
            won(summary.distributed_total)
        );
    }

    if args.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&distribution)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{won, Args};
    use clap::Parser;

    #[test]
    fn won_groups_thousands() {
        assert_eq!(won(0.0), "₩0");
        assert_eq!(won(999.0), "₩999");
        assert_eq!(won(1_000.0), "₩1,000");
        assert_eq!(won(530_000.0), "₩530,000");
        assert_eq!(won(1_000_000.4), "₩1,000,000");
        assert_eq!(won(-2_500.0), "₩-2,500");
    }

    #[test]
    fn args_accept_config_and_json() {
        let args = Args::try_parse_from(["demo", "coop.toml", "--json"]).unwrap();
        assert_eq!(args.config.unwrap().to_str(), Some("coop.toml"));
        assert!(args.json);

        let args = Args::try_parse_from(["demo"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.json);
    }

    #[test]
    fn args_reject_unknown_flags() {
        assert!(Args::try_parse_from(["demo", "--jsn", "coop.toml"]).is_err());
    }
}

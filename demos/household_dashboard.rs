use dotenv::dotenv;
use shared_finance_tracker::{
    BudgetStatus, Category, MutationOutcome, NewTransaction, Payer, Session, TrackerConfig,
};
use std::error::Error;

/// Usage: household_dashboard [<description> <amount> <Wife|Husband>]
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let config = TrackerConfig::from_env()?;

    println!("💰 Shared Finance Tracker");
    println!("═══════════════════════════════════════════════════════════════\n");

    let mut session = match Session::connect(config.document_store()).await {
        Ok(session) => session.with_calendar(config.month_calendar),
        Err(e) => {
            eprintln!("❌ Failed to load financial data. Please try again later.");
            return Err(e.into());
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [description, amount, payer] = args.as_slice() {
        let amount: f64 = amount.parse()?;
        let paid_by = match payer.as_str() {
            "Wife" => Payer::Wife,
            "Husband" => Payer::Husband,
            other => return Err(format!("unknown payer '{}'", other).into()),
        };

        let category = suggest(&config, description).await;
        println!("   ✨ Suggested category: {}", category);

        let input = NewTransaction::new(description.clone(), amount, category, paid_by);
        match session.add_transaction(input).await? {
            MutationOutcome::Committed(_) => println!("   ✅ Saved '{}'\n", description),
            MutationOutcome::RolledBack { error, .. } => {
                println!("   ⚠️  Could not save your changes: {}\n", error)
            }
        }
    }

    let summary = session.current_dashboard();

    println!("📊 Totals (all time)");
    println!("   Total Spent: ${:.2}", summary.total_spent);
    for (payer, amount) in summary.by_payer.iter() {
        println!("   {}'s Spending: ${:.2}", payer, amount);
    }
    println!();

    println!("🎯 {} Budgets", summary.month.label());
    for row in &summary.budgets {
        let marker = match row.status {
            BudgetStatus::OnTrack => "  ",
            BudgetStatus::Warning => "⚠️",
            BudgetStatus::OverBudget => "🔴",
        };
        println!(
            "   {} {:<14} ${:>9.2} / ${:>9.2}  ({:>5.1}%)",
            marker, row.category, row.spent, row.budget, row.percentage
        );
    }
    println!();

    println!("🧾 Recent Transactions");
    if summary.recent.is_empty() {
        println!("   No transactions yet.");
    }
    for t in summary.recent.iter().take(10) {
        println!(
            "   {}  {:<24} {:<14} {:<8} ${:.2}",
            t.date.format("%Y-%m-%d"),
            t.description,
            t.category,
            t.paid_by,
            t.amount
        );
    }
    println!();

    let this_month = summary.month;
    for month in [this_month.prev(), this_month] {
        let report = session.monthly_report(month);
        println!("📈 {} (${:.2})", month.label(), report.total_spent);
        if report.chart.is_empty() {
            println!("   No spending data for this month.");
        }
        for point in &report.chart {
            let label = if point.show_label {
                format!("{:.0}%", point.share * 100.0)
            } else {
                String::new()
            };
            println!(
                "   {:<14} ${:>9.2} {}",
                point.category,
                point.display_amount(),
                label
            );
        }
        println!();
    }

    Ok(())
}

async fn suggest(config: &TrackerConfig, description: &str) -> Category {
    match config.category_advisor() {
        Some(advisor) => advisor.suggest(description).await,
        None => Category::default(),
    }
}

use dotenv::dotenv;
use shared_finance_tracker::{config, CategoryAdvisor, GeminiClassifier, GeminiClient};
use std::error::Error;

/// Usage: suggest_category <description>...
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
    let model = std::env::var("GEMINI_MODEL")
        .unwrap_or_else(|_| config::DEFAULT_GEMINI_MODEL.to_string());

    let advisor = CategoryAdvisor::new(GeminiClassifier::new(GeminiClient::new(api_key), model));

    let mut descriptions: Vec<String> = std::env::args().skip(1).collect();
    if descriptions.is_empty() {
        descriptions = vec![
            "Weekly shop at Tesco".to_string(),
            "Pizza night".to_string(),
            "Uber to the airport".to_string(),
            "Electricity bill".to_string(),
            "Gym".to_string(),
            "abc".to_string(),
        ];
    }

    println!("✨ Category suggestions");
    println!("═══════════════════════════════════════════════════════════════\n");

    let suggestions =
        futures::future::join_all(descriptions.iter().map(|d| advisor.suggest(d))).await;

    for (description, category) in descriptions.iter().zip(suggestions) {
        println!("   {:<32} → {}", description, category);
    }

    Ok(())
}

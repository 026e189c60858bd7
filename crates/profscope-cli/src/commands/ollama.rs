//! Ollama-related command implementations

use anyhow::Result;
use chrono::{Duration, Utc};

use profscope_core::{
    build_prompt, parse_analysis, AnalysisBackend, AnalysisClient, Config, ProfileKind,
    SamplePoint, TimeSeriesStore,
};

/// Test the Ollama connection and, optionally, a full analysis round trip
pub async fn cmd_ollama_test(config: &Config, generate: bool) -> Result<()> {
    println!("🔍 Testing Ollama connection...\n");

    // Environment overrides win over the config file, matching AnalysisClient::from_env
    let client = AnalysisClient::from_env().unwrap_or_else(|| AnalysisClient::ollama(&config.ollama));
    println!("  Host: {}", client.host());
    println!("  Model: {}\n", client.model());

    print!("Checking Ollama availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not connect to Ollama at {}", client.host());
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", client.model());
        println!(
            "  4. Point profscope at it: export OLLAMA_HOST={}",
            client.host()
        );
        return Ok(());
    }

    if generate {
        println!("\n📋 Sending a synthetic heap profile for analysis...\n");
        let prompt = build_prompt(ProfileKind::Heap, &synthetic_store());

        match client.generate(&prompt).await {
            Ok(raw) => {
                let analysis = parse_analysis(&raw);
                println!(
                    "  Parsed {} insights, {} recommendations, {} code suggestions",
                    analysis.insights.len(),
                    analysis.recommendations.len(),
                    analysis.code_suggestions.len()
                );
                println!("  Summary: {}", analysis.summary);
            }
            Err(e) => println!("  ❌ Error: {}", e),
        }
    }

    println!("\n✅ Ollama test complete!");
    Ok(())
}

/// A small growing heap profile, enough to exercise every prompt section
fn synthetic_store() -> TimeSeriesStore {
    let mut store = TimeSeriesStore::new(16);
    let start = Utc::now() - Duration::seconds(10);
    for i in 0..5 {
        let raw = [
            (
                "app/cache.(*Store).Set".to_string(),
                SamplePoint::new(40.0 + i as f64 * 6.0, 55.0),
            ),
            (
                "app/http.handleRequest".to_string(),
                SamplePoint::new(12.0, 30.0),
            ),
            ("runtime.mallocgc".to_string(), SamplePoint::new(5.0, 5.0)),
        ]
        .into_iter()
        .collect();
        let ts = start + Duration::seconds(i * 2);
        if let Err(e) = store.merge(ts, &raw) {
            tracing::warn!("Failed to build synthetic store: {}", e);
        }
    }
    store
}

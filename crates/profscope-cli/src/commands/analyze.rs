//! Analyze command: heuristic detectors plus optional LLM analysis

use std::path::Path;

use anyhow::Result;

use profscope_core::{
    AnalysisBackend, AnalysisClient, Config, LlmAnalysis, ProfileInsights, Severity,
};

use super::{parse_kind, read_records, session_from_records};

/// Run the detectors on a recorded sample file
pub async fn cmd_analyze(
    config: &Config,
    file: &Path,
    kind: &str,
    llm: bool,
    mock_llm: bool,
    model: Option<&str>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let records = read_records(file)?;
    if records.is_empty() {
        println!("No samples found in {}", file.display());
        return Ok(());
    }

    println!(
        "🔍 Analyzing {} {} samples from {}\n",
        records.len(),
        kind,
        file.display()
    );

    let session = session_from_records(config, kind, &records)?;
    let insights = session.insights()?;
    print_insights(&insights);

    if llm || mock_llm {
        let client = if mock_llm {
            AnalysisClient::mock()
        } else {
            let client = AnalysisClient::ollama(&config.ollama);
            match model {
                Some(model) => client.with_model(model),
                None => client,
            }
        };

        println!(
            "\n🤖 Requesting LLM analysis ({} @ {})...\n",
            client.model(),
            client.host()
        );
        let analysis = session.analyze(&client).await?;
        print_analysis(&analysis);
    }

    Ok(())
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
    }
}

pub(crate) fn print_insights(insights: &ProfileInsights) {
    println!("📋 {}", insights.summary);

    if insights.insights.is_empty() {
        println!("   No findings.");
    } else {
        for insight in &insights.insights {
            println!("   {} {}", severity_icon(insight.severity), insight.message);
        }
    }

    if !insights.top_consumers.is_empty() {
        println!("\n🏆 Top consumers:");
        for consumer in &insights.top_consumers {
            println!(
                "   {:>6.1}%  {:>10.2}  {}",
                consumer.percentage_of_total, consumer.value, consumer.name
            );
        }
    }
}

fn print_analysis(analysis: &LlmAnalysis) {
    if !analysis.insights.is_empty() {
        println!("💡 Insights:");
        for insight in &analysis.insights {
            println!("   {} {}", severity_icon(insight.severity), insight.message);
        }
        println!();
    }

    if !analysis.recommendations.is_empty() {
        println!("✅ Recommendations:");
        for rec in &analysis.recommendations {
            println!("   - {}", rec);
        }
        println!();
    }

    if !analysis.code_suggestions.is_empty() {
        println!("🔧 Code suggestions:");
        for suggestion in &analysis.code_suggestions {
            println!("   - {}", suggestion);
        }
        println!();
    }

    println!("📝 {}", analysis.summary);
}

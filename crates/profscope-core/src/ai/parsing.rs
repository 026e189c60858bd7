//! Response parsing for the analysis endpoint
//!
//! Models are instructed to answer with four fixed `=== SECTION ===`
//! markers, but replies drift. Parsing is therefore total and two-tier:
//! the marker-based extractor runs first, and only when no marker is
//! present at all does the blank-line heuristic take over. Both tiers are
//! independent pure functions composed by [`parse_analysis`].

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::insights::{Insight, Severity};

use super::types::LlmAnalysis;

pub const INSIGHTS_MARKER: &str = "=== INSIGHTS ===";
pub const RECOMMENDATIONS_MARKER: &str = "=== RECOMMENDATIONS ===";
pub const CODE_SUGGESTIONS_MARKER: &str = "=== CODE_SUGGESTIONS ===";
pub const SUMMARY_MARKER: &str = "=== SUMMARY ===";

const NO_SUMMARY: &str = "No summary available";

/// Intermediate result shared by both tiers
#[derive(Default)]
struct Extracted {
    insights: Vec<Insight>,
    recommendations: Vec<String>,
    code_suggestions: Vec<String>,
    summary: Option<String>,
}

/// Parse a raw model reply into a typed analysis. Never fails: unusable
/// input yields empty collections and a placeholder summary.
pub fn parse_analysis(raw: &str) -> LlmAnalysis {
    let extracted = match parse_sections(raw) {
        Some(extracted) => extracted,
        None => parse_blocks(raw),
    };
    finalize(extracted)
}

/// Tier 1: extract the four `=== X ===` sections.
///
/// Sections may appear in any order and each is optional; returns None only
/// when no marker is present at all, which hands the text to tier 2.
fn parse_sections(raw: &str) -> Option<Extracted> {
    let insights_body = section_body(raw, INSIGHTS_MARKER);
    let recommendations_body = section_body(raw, RECOMMENDATIONS_MARKER);
    let code_body = section_body(raw, CODE_SUGGESTIONS_MARKER);
    let summary_body = section_body(raw, SUMMARY_MARKER);

    if insights_body.is_none()
        && recommendations_body.is_none()
        && code_body.is_none()
        && summary_body.is_none()
    {
        return None;
    }

    Some(Extracted {
        insights: insights_body.map(parse_insight_lines).unwrap_or_default(),
        recommendations: recommendations_body
            .map(|body| parse_bullet_lines(body, &['-']))
            .unwrap_or_default(),
        code_suggestions: code_body
            .map(|body| parse_bullet_lines(body, &['-']))
            .unwrap_or_default(),
        summary: summary_body
            .map(|body| body.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// Tier 2: classify blank-line-separated blocks by keyword.
fn parse_blocks(raw: &str) -> Extracted {
    let mut extracted = Extracted::default();

    for block in raw.split("\n\n") {
        let lowered = block.to_lowercase();
        if lowered.contains("insight") {
            let body = strip_heading(block, "insights?:?");
            extracted.insights.extend(parse_insight_lines(&body));
        } else if lowered.contains("recommend") {
            let body = strip_heading(block, "recommendations?:?");
            extracted
                .recommendations
                .extend(parse_bullet_lines(&body, &['-', '*']));
        } else if lowered.contains("code") {
            let body = strip_heading(block, r"code[_\s]suggestions?:?");
            extracted
                .code_suggestions
                .extend(parse_bullet_lines(&body, &['-', '*']));
        } else if lowered.contains("summary") {
            let body = strip_heading(block, "summary:?").trim().to_string();
            if !body.is_empty() {
                extracted.summary = Some(body);
            }
        }
    }

    extracted
}

/// Apply summary synthesis and defaults to an extracted result
fn finalize(extracted: Extracted) -> LlmAnalysis {
    let Extracted {
        insights,
        recommendations,
        code_suggestions,
        summary,
    } = extracted;

    let summary = summary.unwrap_or_else(|| {
        if insights.is_empty() && recommendations.is_empty() {
            NO_SUMMARY.to_string()
        } else {
            // Keep the UI supplied with context even when the model skipped
            // its summary paragraph.
            let mut synthesized = format!(
                "Analysis found {} insights and {} recommendations. ",
                insights.len(),
                recommendations.len()
            );
            if let Some(first) = insights.first() {
                synthesized.push_str(&format!("Key insight: {}", first.message));
            }
            synthesized
        }
    });

    LlmAnalysis {
        insights,
        summary,
        recommendations,
        code_suggestions,
    }
}

/// Body of one marked section: text between the marker and the next `===`
fn section_body<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = rest.find("===").unwrap_or(rest.len());
    Some(&rest[..end])
}

fn severity_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[(critical|warning)\]").expect("valid severity tag regex"))
}

/// Insight lines start with `-`, `*`, or `[`; a `[CRITICAL]`/`[WARNING]`
/// tag anywhere in the line sets the severity and is stripped from the
/// message.
fn parse_insight_lines(text: &str) -> Vec<Insight> {
    let timestamp = Utc::now();
    text.lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && (line.starts_with('-') || line.starts_with('*') || line.starts_with('['))
        })
        .map(|line| {
            let clean = line.trim_start_matches(['-', '*']).trim();
            let lowered = clean.to_lowercase();
            let severity = if lowered.contains("[critical]") {
                Severity::Critical
            } else if lowered.contains("[warning]") {
                Severity::Warning
            } else {
                Severity::Info
            };
            let message = severity_tag_re().replace_all(clean, "").trim().to_string();
            Insight::new(severity, message, timestamp, "llm_insight")
        })
        .collect()
}

/// Bulleted lines with the leading marker stripped
fn parse_bullet_lines(text: &str, markers: &[char]) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.starts_with(markers))
        .map(|line| line.trim_start_matches(markers).trim().to_string())
        .collect()
}

/// Remove a block's heading keyword (tier 2 blocks carry "Insights:" etc.)
fn strip_heading(block: &str, heading_pattern: &str) -> String {
    match Regex::new(&format!("(?i){heading_pattern}")) {
        Ok(re) => re.replacen(block, 1, "").trim().to_string(),
        Err(_) => block.trim().to_string(),
    }
}

//! Plain-text rendering of analysis results for the terminal.

use crate::analysis::ChartAnalysis;
use crate::models::AnalysisResponse;
use std::fmt::{self, Display, Formatter};

const LABEL_WIDTH: usize = 14;

fn write_line(
    f: &mut Formatter<'_>,
    indent: &str,
    label: &str,
    value: &dyn Display,
) -> fmt::Result {
    writeln!(
        f,
        "{}{:<width$}{}",
        indent,
        format!("{}:", label),
        value,
        width = LABEL_WIDTH
    )
}

fn write_section(
    f: &mut Formatter<'_>,
    title: &str,
    lines: &[(&str, Option<String>)],
) -> fmt::Result {
    if lines.iter().all(|(_, value)| value.is_none()) {
        return Ok(());
    }
    writeln!(f, "\n{}", title)?;
    for (label, value) in lines {
        if let Some(value) = value {
            write_line(f, "  ", label, value)?;
        }
    }
    Ok(())
}

/// Report layout for a parsed record; lines and sections without data are left out.
pub struct Report<'a>(pub &'a ChartAnalysis);

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let analysis = self.0;
        f.write_str("Chart Analysis\n==============\n")?;

        if let Some(pattern) = &analysis.pattern {
            write_line(f, "", "Pattern", pattern)?;
        }
        if let Some(confidence) = &analysis.confidence {
            write_line(f, "", "Confidence", confidence)?;
        }
        if let Some(trend) = &analysis.trend {
            write_line(f, "", "Trend", trend)?;
        }

        write_section(
            f,
            "Entry & Targets",
            &[
                ("Entry Point", analysis.entry_point.as_ref().map(|v| v.to_string())),
                ("Target", analysis.target.as_ref().map(|v| v.to_string())),
                ("Risk:Reward", analysis.risk_reward.clone()),
            ],
        )?;

        write_section(
            f,
            "Risk Management",
            &[
                ("Stop Loss", analysis.stop_loss.as_ref().map(|v| v.to_string())),
                ("Timeframe", analysis.timeframe.clone()),
            ],
        )?;

        if let Some(explanation) = &analysis.explanation {
            writeln!(f, "\nAnalysis Explanation\n  {}", explanation)?;
        }
        Ok(())
    }
}

/// Envelope layout, preferring the structured record when there is one.
pub struct ResponseView<'a> {
    pub response: &'a AnalysisResponse,
    pub analysis: Option<&'a ChartAnalysis>,
}

impl Display for ResponseView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let response = self.response;

        if !response.success {
            writeln!(
                f,
                "Error: {}",
                response.error.as_deref().unwrap_or("Unknown error")
            )?;
            if let Some(details) = &response.details {
                writeln!(f, "Details: {}", details)?;
            }
            return Ok(());
        }

        match self.analysis {
            Some(analysis) => Report(analysis).fmt(f)?,
            None => writeln!(
                f,
                "Raw analysis (not structured JSON):\n{}",
                response.analysis.as_deref().unwrap_or_default()
            )?,
        }

        if let Some(info) = &response.image_info {
            writeln!(
                f,
                "\nImage: {} ({} bytes, {})",
                info.name.as_deref().unwrap_or("chart"),
                info.size,
                info.media_type
            )?;
        }
        if let Some(timestamp) = &response.timestamp {
            writeln!(f, "Analyzed at {}", timestamp)?;
        }
        Ok(())
    }
}

pub fn render_report(analysis: &ChartAnalysis) -> String {
    Report(analysis).to_string()
}

pub fn render_response(response: &AnalysisResponse, analysis: Option<&ChartAnalysis>) -> String {
    ResponseView { response, analysis }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{parse_analysis, Confidence, Level, Trend};

    #[test]
    fn test_full_report_contains_every_value() {
        let analysis = ChartAnalysis {
            pattern: Some("Bull Flag".to_string()),
            confidence: Some(Confidence::High),
            trend: Some(Trend::Bullish),
            timeframe: Some("1H".to_string()),
            entry_point: Some(Level::Number(101.5)),
            stop_loss: Some(Level::Number(99.0)),
            target: Some(Level::Text("110".to_string())),
            risk_reward: Some("1:3".to_string()),
            explanation: Some("Clean breakout.".to_string()),
            ..Default::default()
        };

        let report = render_report(&analysis);
        for expected in [
            "Pattern:      Bull Flag",
            "Confidence:   High",
            "Trend:        Bullish",
            "Entry & Targets",
            "Entry Point:  101.5",
            "Target:       110",
            "Risk:Reward:  1:3",
            "Risk Management",
            "Stop Loss:    99",
            "Timeframe:    1H",
            "Analysis Explanation\n  Clean breakout.",
        ] {
            assert!(report.contains(expected), "missing {:?} in\n{}", expected, report);
        }
    }

    #[test]
    fn test_absent_fields_are_not_rendered() {
        let analysis = parse_analysis(
            r#"{"pattern":"Head and Shoulders","confidence":"High","trend":"Bearish","explanation":"test"}"#,
        )
        .unwrap();

        let report = render_report(&analysis);
        assert!(report.contains("Head and Shoulders"));
        assert!(!report.contains("Entry & Targets"));
        assert!(!report.contains("Risk Management"));
        assert!(!report.contains("Stop Loss"));
    }

    #[test]
    fn test_failure_response() {
        let response = AnalysisResponse::failure("Analysis failed").with_details("boom");
        let text = render_response(&response, None);
        assert_eq!(text, "Error: Analysis failed\nDetails: boom\n");
    }

    #[test]
    fn test_unparsed_success_shows_raw_text() {
        let response = AnalysisResponse {
            success: true,
            analysis: Some("The chart shows a wedge.".to_string()),
            ..Default::default()
        };
        let text = render_response(&response, None);
        assert!(text.contains("Raw analysis"));
        assert!(text.contains("The chart shows a wedge."));
    }
}

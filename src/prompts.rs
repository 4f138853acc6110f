pub const CHART_ANALYSIS: &str = include_str!("../data/prompts/chart_analysis.txt");

/// Keys the analysis prompt asks the model to return.
pub const ANALYSIS_KEYS: &[&str] = &[
    "pattern",
    "confidence",
    "timeframe",
    "trend",
    "entryPoint",
    "stopLoss",
    "target",
    "riskReward",
    "explanation",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_non_empty() {
        assert!(!CHART_ANALYSIS.trim().is_empty());
    }

    #[test]
    fn test_prompt_names_every_key() {
        for key in ANALYSIS_KEYS {
            assert!(
                CHART_ANALYSIS.contains(&format!("\"{}\"", key)),
                "prompt is missing key {}",
                key
            );
        }
    }

    #[test]
    fn test_prompt_asks_for_null_fallback() {
        assert!(CHART_ANALYSIS.contains("null"));
    }
}

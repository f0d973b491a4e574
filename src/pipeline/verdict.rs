//! The three-class verdict and its first-line parser.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Good,
    Moderate,
    Bad,
}

impl Verdict {
    /// The marker the model is instructed to open its response with.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Good => "GOOD ✅",
            Self::Moderate => "MODERATE ⚠️",
            Self::Bad => "BAD ❌",
        }
    }

    /// The class word of the marker, without the emoji.
    fn class_word(&self) -> &'static str {
        self.marker().split(' ').next().unwrap_or("")
    }

    /// Parse the verdict from a model response. The first non-empty line
    /// must be a `## VERDICT:` marker; anything else is a contract
    /// violation and yields `None`. The emoji is tolerated but not
    /// required.
    pub fn parse(analysis: &str) -> Option<Self> {
        let first_line = analysis.lines().find(|line| !line.trim().is_empty())?;
        let rest = first_line.trim().strip_prefix("## VERDICT:")?.trim();
        [Self::Good, Self::Moderate, Self::Bad]
            .into_iter()
            .find(|verdict| rest.starts_with(verdict.class_word()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_markers() {
        assert_eq!(Verdict::parse("## VERDICT: GOOD ✅\nrest"), Some(Verdict::Good));
        assert_eq!(
            Verdict::parse("## VERDICT: MODERATE ⚠️\nrest"),
            Some(Verdict::Moderate)
        );
        assert_eq!(Verdict::parse("## VERDICT: BAD ❌\nrest"), Some(Verdict::Bad));
    }

    #[test]
    fn skips_leading_blank_lines() {
        assert_eq!(Verdict::parse("\n\n## VERDICT: BAD ❌"), Some(Verdict::Bad));
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(Verdict::parse("The cereal looks fine overall."), None);
        assert_eq!(Verdict::parse(""), None);
    }

    #[test]
    fn marker_not_on_first_line_is_none() {
        assert_eq!(Verdict::parse("Summary first.\n## VERDICT: GOOD ✅"), None);
    }

    #[test]
    fn unknown_class_word_is_none() {
        assert_eq!(Verdict::parse("## VERDICT: TERRIBLE"), None);
    }

    #[test]
    fn marker_without_emoji_still_parses() {
        assert_eq!(Verdict::parse("## VERDICT: MODERATE"), Some(Verdict::Moderate));
    }

    #[test]
    fn every_marker_parses_back_to_its_verdict() {
        for verdict in [Verdict::Good, Verdict::Moderate, Verdict::Bad] {
            let line = format!("## VERDICT: {}", verdict.marker());
            assert_eq!(Verdict::parse(&line), Some(verdict));
        }
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::Good).unwrap(), "\"GOOD\"");
        assert_eq!(serde_json::to_string(&Verdict::Bad).unwrap(), "\"BAD\"");
    }
}

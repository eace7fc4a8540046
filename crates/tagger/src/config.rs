use serde::{Deserialize, Serialize};

/// Configuration for the tagging pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Minimum number of words a line needs before it can be matched against
    /// finding fragments as a topic title
    pub min_topic_title_tokens: usize,

    /// Fail with a runtime fault when the first-chapter marker shows up a
    /// third time after the table of contents was closed
    pub reject_repeated_first_chapter: bool,

    /// Keep body passes (ordinals, headers, offices, bodies) out of the
    /// table-of-contents range
    pub body_passes_skip_toc: bool,

    /// Reorder reply ranges written backwards by right-to-left flattening
    /// (`2-1` becomes `1-2`)
    pub normalize_reversed_ranges: bool,

    /// Widest `N-M` reply range expanded into single numbers; a wider range
    /// keeps only `N`
    pub max_reply_range_span: u32,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            min_topic_title_tokens: 2,
            reject_repeated_first_chapter: true,
            body_passes_skip_toc: true,
            normalize_reversed_ranges: true,
            max_reply_range_span: 100,
        }
    }
}

impl TaggerConfig {
    /// Relaxed config for damaged documents: repeated chapter markers are
    /// tolerated instead of aborting the report
    pub fn lenient() -> Self {
        Self {
            reject_repeated_first_chapter: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_topic_title_tokens == 0 {
            return Err("min_topic_title_tokens must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = TaggerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_topic_title_tokens, 2);
    }

    #[test]
    fn test_lenient_config_valid() {
        let config = TaggerConfig::lenient();
        assert!(config.validate().is_ok());
        assert!(!config.reject_repeated_first_chapter);
    }

    #[test]
    fn test_config_validation() {
        let config = TaggerConfig {
            min_topic_title_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: TaggerConfig =
            serde_json::from_str(r#"{"min_topic_title_tokens": 3}"#).unwrap();
        assert_eq!(config.min_topic_title_tokens, 3);
        assert!(config.body_passes_skip_toc);
        assert!(config.normalize_reversed_ranges);
    }
}

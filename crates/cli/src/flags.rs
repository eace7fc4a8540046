use clap::ValueEnum;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Indented JSON
    Pretty,
}

impl OutputFormat {
    pub(crate) fn render<T: serde::Serialize>(self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        }
    }
}

use crate::assembler::{self, Record};
use crate::config::TaggerConfig;
use crate::error::{Result, TaggerError};
use crate::passes::{Pass, PassContext};
use crate::toc::{self, TocBounds};
use crate::types::ReportLines;
use crate::vocabulary::Vocabulary;
use serde::Serialize;

/// Main tagger interface for processing a report
#[derive(Debug, Clone)]
pub struct Tagger {
    config: TaggerConfig,
}

/// Tagged lines of one report together with its TOC bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedReport {
    pub lines: ReportLines,
    pub toc: TocBounds,
}

impl TaggedReport {
    /// Group tagged lines into records
    pub fn records(&self, config: &TaggerConfig) -> Result<Vec<Record>> {
        assembler::assemble(&self.lines, config)
    }

    #[must_use]
    pub fn untagged_count(&self) -> usize {
        self.lines.len() - self.lines.tagged_count()
    }
}

impl Tagger {
    /// Create a new tagger with configuration
    pub fn new(config: TaggerConfig) -> Result<Self> {
        config.validate().map_err(TaggerError::config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Tag flattened report text, one paragraph per line
    pub fn tag_text(&self, text: &str, vocabulary: &Vocabulary) -> Result<TaggedReport> {
        self.tag_lines(ReportLines::from_text(text), vocabulary)
    }

    /// Tag an already split report
    pub fn tag_lines(&self, lines: ReportLines, vocabulary: &Vocabulary) -> Result<TaggedReport> {
        self.tag_with_observer(lines, vocabulary, |_, _| {})
    }

    /// Tag a report, calling `observer` after every pass with the lines as
    /// that pass left them
    pub fn tag_with_observer<F>(
        &self,
        mut lines: ReportLines,
        vocabulary: &Vocabulary,
        mut observer: F,
    ) -> Result<TaggedReport>
    where
        F: FnMut(Pass, &ReportLines),
    {
        let toc = self.tag_toc(&mut lines, vocabulary)?;
        observer(Pass::Toc, &lines);

        let context = PassContext {
            vocabulary,
            config: &self.config,
            toc: &toc,
        };

        for pass in Pass::ORDER.into_iter().filter(|pass| *pass != Pass::Toc) {
            let tagged = context.run(pass, &mut lines);
            log::debug!("Pass {} tagged {tagged} lines", pass.as_str());
            observer(pass, &lines);
        }

        let report = TaggedReport { lines, toc };
        log::debug!(
            "Tagged {} of {} lines ({} untagged)",
            report.lines.tagged_count(),
            report.lines.len(),
            report.untagged_count()
        );

        Ok(report)
    }

    /// Tag and assemble in one go
    pub fn process_text(&self, text: &str, vocabulary: &Vocabulary) -> Result<Vec<Record>> {
        let report = self.tag_text(text, vocabulary)?;
        let records = report.records(&self.config)?;
        log::info!(
            "Tagged {} lines ({} untagged) into {} records",
            report.lines.len(),
            report.untagged_count(),
            records.len()
        );
        Ok(records)
    }

    fn tag_toc(&self, lines: &mut ReportLines, vocabulary: &Vocabulary) -> Result<TocBounds> {
        let bounds = toc::locate(lines, &self.config)?;
        let offices = toc::tag_office_names(lines, &bounds, vocabulary);
        let titles = toc::tag_chapter_titles(lines, &bounds);
        let items = toc::tag_items(lines, &bounds);
        log::debug!(
            "Pass toc tagged {offices} offices, {titles} chapter lines, {items} entry lines"
        );
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;
    use crate::vocabulary::{AlternateNames, ReportPreface};

    const REPORT: &str = "תוכן העניינים
פרק ראשון
1. נושא ראשון.....5

פרק ראשון
ליקוי
1. הועלה כי
תגובה
1. המשרד מסר
שורה יתומה";

    fn vocabulary() -> Vocabulary {
        Vocabulary::resolve(&AlternateNames::default(), &ReportPreface::default())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TaggerConfig {
            min_topic_title_tokens: 0,
            ..Default::default()
        };
        assert!(matches!(Tagger::new(config), Err(TaggerError::Config(_))));
    }

    #[test]
    fn test_tag_text() {
        let tagger = Tagger::new(TaggerConfig::default()).unwrap();
        let report = tagger.tag_text(REPORT, &vocabulary()).unwrap();

        assert_eq!(report.lines.len(), 9);
        assert_eq!(report.toc.end, 3);
        assert_eq!(
            report.lines.tags(),
            vec![
                Tag::TocHeader,
                Tag::TocChapterNumber,
                Tag::TocItemStart,
                Tag::ChapterHeader,
                Tag::FindingHeader,
                Tag::FindingBodyStart,
                Tag::ReplyHeader,
                Tag::ReplyBodyStart,
                Tag::ReplyBodyContinue,
            ]
        );
    }

    #[test]
    fn test_observer_sees_every_pass() {
        let tagger = Tagger::new(TaggerConfig::default()).unwrap();
        let mut seen = Vec::new();
        tagger
            .tag_with_observer(ReportLines::from_text(REPORT), &vocabulary(), |pass, _| {
                seen.push(pass);
            })
            .unwrap();
        assert_eq!(seen, Pass::ORDER.to_vec());
    }

    #[test]
    fn test_boundary_failure_propagates() {
        let tagger = Tagger::new(TaggerConfig::default()).unwrap();
        let err = tagger.tag_text("ליקוי\n1. טקסט", &vocabulary()).unwrap_err();
        assert!(matches!(err, TaggerError::BoundaryNotFound { .. }));
    }
}

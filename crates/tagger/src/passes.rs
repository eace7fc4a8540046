//! Body tagging passes.
//!
//! Every pass walks the lines left to right, touches only untagged lines and
//! looks at most one line back. A tag written at line `i` is visible to the
//! same pass at line `i + 1`, which is how continuation runs grow.

use crate::config::TaggerConfig;
use crate::markers;
use crate::toc::TocBounds;
use crate::types::{Family, ReportLines, Tag};
use crate::vocabulary::Vocabulary;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Tagging passes in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Toc,
    ChapterOrdinals,
    FindingHeaders,
    ReplyHeaders,
    OfficeNames,
    DiscussedOffices,
    TopicTitles,
    FindingBodies,
    ReplyBodies,
}

impl Pass {
    /// Strong, unambiguous signals first; positional heuristics last
    pub const ORDER: [Self; 9] = [
        Self::Toc,
        Self::ChapterOrdinals,
        Self::FindingHeaders,
        Self::ReplyHeaders,
        Self::OfficeNames,
        Self::DiscussedOffices,
        Self::TopicTitles,
        Self::FindingBodies,
        Self::ReplyBodies,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Toc => "toc",
            Self::ChapterOrdinals => "chapter_ordinals",
            Self::FindingHeaders => "finding_headers",
            Self::ReplyHeaders => "reply_headers",
            Self::OfficeNames => "office_names",
            Self::DiscussedOffices => "discussed_offices",
            Self::TopicTitles => "topic_titles",
            Self::FindingBodies => "finding_bodies",
            Self::ReplyBodies => "reply_bodies",
        }
    }
}

/// Read-only inputs shared by the body passes of one report
pub(crate) struct PassContext<'a> {
    pub vocabulary: &'a Vocabulary,
    pub config: &'a TaggerConfig,
    pub toc: &'a TocBounds,
}

impl PassContext<'_> {
    /// Untagged lines a body pass may look at
    fn candidates(&self, lines: &ReportLines) -> Vec<usize> {
        lines
            .untagged_in(0..lines.len())
            .into_iter()
            .filter(|&index| !(self.config.body_passes_skip_toc && self.toc.contains(index)))
            .collect()
    }

    /// Run a body pass, returning how many lines it tagged
    pub fn run(&self, pass: Pass, lines: &mut ReportLines) -> usize {
        let mut tagged = 0;
        for index in self.candidates(lines) {
            // an earlier iteration of this pass may already own the line
            if lines.tag(index).is_tagged() {
                continue;
            }
            if let Some(tag) = self.classify(pass, lines, index) {
                if lines.assign(index, tag) {
                    tagged += 1;
                }
            }
        }
        tagged
    }

    fn classify(&self, pass: Pass, lines: &ReportLines, index: usize) -> Option<Tag> {
        let text = lines.trimmed(index);
        let previous = lines.prev_tag(index);

        match pass {
            Pass::Toc => None,
            Pass::ChapterOrdinals => {
                markers::chapter_ordinal(text).map(|_| Tag::ChapterNumber)
            }
            Pass::FindingHeaders => {
                markers::is_finding_header(text).then_some(Tag::FindingHeader)
            }
            Pass::ReplyHeaders => markers::is_reply_header(text).then_some(Tag::ReplyHeader),
            Pass::OfficeNames => self.vocabulary.is_office(text).then_some(
                if previous == Tag::ReplyHeader {
                    Tag::ReplyOfficeName
                } else {
                    Tag::ChapterOfficeName
                },
            ),
            Pass::DiscussedOffices => {
                if markers::discussed_offices(text).is_some() {
                    Some(Tag::DiscussedOfficesStart)
                } else {
                    (previous.family() == Some(Family::DiscussedOffices))
                        .then_some(Tag::DiscussedOfficesContinue)
                }
            }
            Pass::TopicTitles => {
                let words = text.unicode_words().count();
                (words >= self.config.min_topic_title_tokens
                    && self.vocabulary.in_finding_fragment(text))
                .then(|| Family::TopicTitle.extend_or_open(previous))
            }
            Pass::FindingBodies => match previous {
                Tag::FindingHeader => Some(Tag::FindingBodyStart),
                Tag::FindingBodyStart | Tag::FindingBodyContinue => {
                    Some(Tag::FindingBodyContinue)
                }
                _ => None,
            },
            Pass::ReplyBodies => match previous {
                Tag::ReplyHeader | Tag::ReplyOfficeName => Some(Tag::ReplyBodyStart),
                Tag::ReplyBodyStart | Tag::ReplyBodyContinue => Some(Tag::ReplyBodyContinue),
                _ => None,
            },
        }
    }
}

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Structural role assigned to a report line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// No pass matched (yet)
    #[default]
    Untagged,
    /// "Table of contents" heading
    TocHeader,
    /// Chapter ordinal alone inside the TOC ("chapter two")
    TocChapterNumber,
    /// Chapter ordinal followed by a title inside the TOC
    TocChapterTitleStart,
    /// Wrapped remainder of a TOC chapter title
    TocChapterTitleContinue,
    /// Cross-office chapter title, never followed by an office line
    TocChapterCrossOffice,
    /// Office name listed under a TOC chapter
    TocChapterOffice,
    /// First line of a TOC entry
    TocItemStart,
    /// Wrapped line of a TOC entry, up to its page leader
    TocItemContinue,
    /// Heading that closes the TOC and opens the first chapter
    ChapterHeader,
    /// Chapter ordinal alone in the report body
    ChapterNumber,
    /// Office a chapter topic is about
    ChapterOfficeName,
    /// "Controlled bodies: ..." line
    DiscussedOfficesStart,
    DiscussedOfficesContinue,
    /// Topic title recognized from the report's finding fragments
    TopicTitleStart,
    TopicTitleContinue,
    /// "Finding" literal
    FindingHeader,
    /// Numbered finding text
    FindingBodyStart,
    FindingBodyContinue,
    /// "Reply" literal
    ReplyHeader,
    /// Office answering a finding, right after the reply literal
    ReplyOfficeName,
    /// Numbered reply text
    ReplyBodyStart,
    ReplyBodyContinue,
}

/// Tag families that span more than one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    TocChapterTitle,
    TocItem,
    DiscussedOffices,
    TopicTitle,
    FindingBody,
    ReplyBody,
}

impl Family {
    pub const ALL: [Self; 6] = [
        Self::TocChapterTitle,
        Self::TocItem,
        Self::DiscussedOffices,
        Self::TopicTitle,
        Self::FindingBody,
        Self::ReplyBody,
    ];

    /// Tag opening a run of this family
    #[must_use]
    pub const fn start(self) -> Tag {
        match self {
            Self::TocChapterTitle => Tag::TocChapterTitleStart,
            Self::TocItem => Tag::TocItemStart,
            Self::DiscussedOffices => Tag::DiscussedOfficesStart,
            Self::TopicTitle => Tag::TopicTitleStart,
            Self::FindingBody => Tag::FindingBodyStart,
            Self::ReplyBody => Tag::ReplyBodyStart,
        }
    }

    /// Tag extending a run of this family
    #[must_use]
    pub const fn continuation(self) -> Tag {
        match self {
            Self::TocChapterTitle => Tag::TocChapterTitleContinue,
            Self::TocItem => Tag::TocItemContinue,
            Self::DiscussedOffices => Tag::DiscussedOfficesContinue,
            Self::TopicTitle => Tag::TopicTitleContinue,
            Self::FindingBody => Tag::FindingBodyContinue,
            Self::ReplyBody => Tag::ReplyBodyContinue,
        }
    }

    /// Pick start or continuation depending on the tag of the previous line
    #[must_use]
    pub fn extend_or_open(self, previous: Tag) -> Tag {
        if previous.family() == Some(self) {
            self.continuation()
        } else {
            self.start()
        }
    }
}

impl Tag {
    /// Family this tag belongs to, `None` for standalone tags
    #[must_use]
    pub const fn family(self) -> Option<Family> {
        match self {
            Self::TocChapterTitleStart | Self::TocChapterTitleContinue => {
                Some(Family::TocChapterTitle)
            }
            Self::TocItemStart | Self::TocItemContinue => Some(Family::TocItem),
            Self::DiscussedOfficesStart | Self::DiscussedOfficesContinue => {
                Some(Family::DiscussedOffices)
            }
            Self::TopicTitleStart | Self::TopicTitleContinue => Some(Family::TopicTitle),
            Self::FindingBodyStart | Self::FindingBodyContinue => Some(Family::FindingBody),
            Self::ReplyBodyStart | Self::ReplyBodyContinue => Some(Family::ReplyBody),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_continuation(self) -> bool {
        matches!(
            self,
            Self::TocChapterTitleContinue
                | Self::TocItemContinue
                | Self::DiscussedOfficesContinue
                | Self::TopicTitleContinue
                | Self::FindingBodyContinue
                | Self::ReplyBodyContinue
        )
    }

    #[must_use]
    pub const fn is_tagged(self) -> bool {
        !matches!(self, Self::Untagged)
    }

    /// Tags whose group carries a chapter ordinal
    #[must_use]
    pub const fn is_chapter(self) -> bool {
        matches!(
            self,
            Self::TocChapterNumber
                | Self::TocChapterTitleStart
                | Self::TocChapterCrossOffice
                | Self::ChapterHeader
                | Self::ChapterNumber
        )
    }

    /// Tags whose text is exactly an office name
    #[must_use]
    pub const fn is_office(self) -> bool {
        matches!(
            self,
            Self::TocChapterOffice | Self::ChapterOfficeName | Self::ReplyOfficeName
        )
    }

    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Untagged => "untagged",
            Self::TocHeader => "toc_header",
            Self::TocChapterNumber => "toc_chapter_number",
            Self::TocChapterTitleStart => "toc_chapter_title_start",
            Self::TocChapterTitleContinue => "toc_chapter_title_continue",
            Self::TocChapterCrossOffice => "toc_chapter_cross_office",
            Self::TocChapterOffice => "toc_chapter_office",
            Self::TocItemStart => "toc_item_start",
            Self::TocItemContinue => "toc_item_continue",
            Self::ChapterHeader => "chapter_header",
            Self::ChapterNumber => "chapter_number",
            Self::ChapterOfficeName => "chapter_office_name",
            Self::DiscussedOfficesStart => "discussed_offices_start",
            Self::DiscussedOfficesContinue => "discussed_offices_continue",
            Self::TopicTitleStart => "topic_title_start",
            Self::TopicTitleContinue => "topic_title_continue",
            Self::FindingHeader => "finding_header",
            Self::FindingBodyStart => "finding_body_start",
            Self::FindingBodyContinue => "finding_body_continue",
            Self::ReplyHeader => "reply_header",
            Self::ReplyOfficeName => "reply_office_name",
            Self::ReplyBodyStart => "reply_body_start",
            Self::ReplyBodyContinue => "reply_body_continue",
        }
    }
}

/// One paragraph of the flattened report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    text: String,
    tag: Tag,
}

impl Line {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: Tag::Untagged,
        }
    }

    /// Text exactly as it appeared in the input
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text without surrounding whitespace, used by every matcher
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    #[must_use]
    pub const fn is_tagged(&self) -> bool {
        self.tag.is_tagged()
    }
}

/// Ordered lines of one report.
///
/// The sequence length is fixed once built. Tags are write-once: `assign`
/// refuses to touch a line that already carries a tag, so a later pass can
/// never undo an earlier decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportLines {
    lines: Vec<Line>,
}

impl ReportLines {
    /// Split flattened text into lines, dropping blank ones
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines().filter(|line| !line.trim().is_empty()))
    }

    /// Build from already split paragraphs, kept as given
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Line::new).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    /// Tag of a line, `Untagged` past the end
    #[must_use]
    pub fn tag(&self, index: usize) -> Tag {
        self.lines.get(index).map_or(Tag::Untagged, Line::tag)
    }

    /// Trimmed text of a line, empty past the end
    #[must_use]
    pub fn trimmed(&self, index: usize) -> &str {
        self.lines.get(index).map_or("", Line::trimmed)
    }

    /// Tag of the line right before `index`; the first line has no left
    /// context and sees `Untagged`
    #[must_use]
    pub fn prev_tag(&self, index: usize) -> Tag {
        index
            .checked_sub(1)
            .map_or(Tag::Untagged, |prev| self.tag(prev))
    }

    /// Indices of all untagged lines in `range`, clamped to the sequence
    #[must_use]
    pub fn untagged_in(&self, range: Range<usize>) -> Vec<usize> {
        let end = range.end.min(self.lines.len());
        (range.start.min(end)..end)
            .filter(|&index| !self.lines[index].is_tagged())
            .collect()
    }

    /// Assign a tag to an untagged line. Returns `false` and leaves the line
    /// unchanged when it is already tagged or out of range.
    pub(crate) fn assign(&mut self, index: usize, tag: Tag) -> bool {
        match self.lines.get_mut(index) {
            Some(line) if !line.is_tagged() && tag.is_tagged() => {
                line.tag = tag;
                true
            }
            _ => false,
        }
    }

    /// Snapshot of every tag in line order
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.lines.iter().map(Line::tag).collect()
    }

    #[must_use]
    pub fn tagged_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_tagged()).count()
    }
}

impl<'a> IntoIterator for &'a ReportLines {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_round_trip() {
        for family in Family::ALL {
            assert_eq!(family.start().family(), Some(family));
            assert_eq!(family.continuation().family(), Some(family));
            assert!(family.continuation().is_continuation());
            assert!(!family.start().is_continuation());
        }
    }

    #[test]
    fn test_extend_or_open() {
        let family = Family::FindingBody;
        assert_eq!(
            family.extend_or_open(Tag::FindingBodyStart),
            Tag::FindingBodyContinue
        );
        assert_eq!(
            family.extend_or_open(Tag::FindingBodyContinue),
            Tag::FindingBodyContinue
        );
        assert_eq!(family.extend_or_open(Tag::ReplyBodyStart), Tag::FindingBodyStart);
        assert_eq!(family.extend_or_open(Tag::Untagged), Tag::FindingBodyStart);
    }

    #[test]
    fn test_standalone_tags_have_no_family() {
        for tag in [
            Tag::Untagged,
            Tag::TocHeader,
            Tag::ChapterHeader,
            Tag::FindingHeader,
            Tag::ReplyHeader,
            Tag::ReplyOfficeName,
        ] {
            assert_eq!(tag.family(), None);
            assert!(!tag.is_continuation());
        }
    }

    #[test]
    fn test_from_text_drops_blank_lines() {
        let lines = ReportLines::from_text("first\n\n   \nsecond\r\nthird");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.trimmed(1), "second");
        assert_eq!(lines.tagged_count(), 0);
    }

    #[test]
    fn test_assign_is_write_once() {
        let mut lines = ReportLines::from_lines(["a", "b"]);
        assert!(lines.assign(0, Tag::FindingHeader));
        assert!(!lines.assign(0, Tag::ReplyHeader));
        assert_eq!(lines.tag(0), Tag::FindingHeader);
        assert!(!lines.assign(1, Tag::Untagged));
        assert!(!lines.assign(5, Tag::ReplyHeader));
    }

    #[test]
    fn test_prev_tag_of_first_line_is_untagged() {
        let mut lines = ReportLines::from_lines(["a", "b"]);
        lines.assign(1, Tag::ReplyHeader);
        assert_eq!(lines.prev_tag(0), Tag::Untagged);
        assert_eq!(lines.prev_tag(1), Tag::Untagged);
        lines.assign(0, Tag::FindingHeader);
        assert_eq!(lines.prev_tag(1), Tag::FindingHeader);
    }

    #[test]
    fn test_untagged_in_clamps_range() {
        let mut lines = ReportLines::from_lines(["a", "b", "c"]);
        lines.assign(1, Tag::TocHeader);
        assert_eq!(lines.untagged_in(0..10), vec![0, 2]);
        assert!(lines.untagged_in(5..10).is_empty());
    }
}

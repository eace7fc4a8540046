//! Fixed table of structural markers found in flattened audit reports.
//!
//! Header markers are anchored to the whole line. Data-bearing markers
//! (numbered items, finding and reply numbers) are anchored to the start of
//! the line so the trailing text can be sliced off.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("regex is compile-time constant")
}

// "תוכן העניינים", tolerating a missing definite article or yod
static TOC_HEADER_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*תוכן ה?עניי?נים\s*$"));

// "פרק ראשון" with or without a trailing title
static FIRST_CHAPTER_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*פרק\s+ראשון(?:\s.*)?$"));

static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*(?:תקציר\s+.*|תקצירים\s*)$"));

static CHAPTER_ORDINAL_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*פרק\s+(\w+)\s*$"));

static CHAPTER_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*פרק\s+(\w+)\s+[-–]\s+(.+?)\s*$"));

// cross-office chapters are not followed by an office line
static CROSS_OFFICE_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*פרק\s+(\w+)\s+[-–]\s+(מטלות רוחב(?:\s+.+?)?)\s*$"));

static CHAPTER_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*פרק\s+(\w+)\s*(?:[-–:]\s*)?(.*?)\s*$"));

// "1.  title.....49", leader and page optional
static TOC_ITEM_START_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*([0-9]+)\.\s+(.+?)(?:\s*\.{3,}\s*([0-9]+))?\s*$"));

static TOC_ITEM_END_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*(.+?)\s*\.{3,}\s*([0-9]+)\s*$"));

static TOC_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*(?:([0-9]+)\.\s+)?(.+?)(?:\s*\.{3,}\s*([0-9]+))?\s*$"));

// "ליקוי", also written defectively or in plural
static FINDING_HEADER_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*(?:ליקוי|לקוי|ליקויים)\s*$"));

static REPLY_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*(?:תגובה|תגובות)(?:\s+כללית)?\s*$"));

static DISCUSSED_OFFICES_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^\s*(?:הגוף המבוקר|הגופים המבוקרים|המשרדים המבוקרים)\s?:\s*(.*?)\s*$")
});

static FINDING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*([0-9]+)\S*(?:\s+(.*?))?\s*$"));

static REPLY_NUMBER_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*([0-9]+)(?:[-–]([0-9]+))?\S*(?:\s+(.*?))?\s*$"));

/// Chapter ordinal words, in order; position + 1 is the chapter number
pub const ORDINAL_WORDS: [&str; 10] = [
    "ראשון", "שני", "שלישי", "רביעי", "חמישי", "שישי", "שביעי", "שמיני", "תשיעי", "עשירי",
];

/// Convert a chapter ordinal word to its 1-based number
#[must_use]
pub fn ordinal_value(word: &str) -> Option<u32> {
    let word = word.trim();
    ORDINAL_WORDS
        .iter()
        .position(|candidate| *candidate == word)
        .and_then(|index| u32::try_from(index + 1).ok())
}

/// Every structural marker the passes look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    TocHeader,
    FirstChapter,
    Summary,
    ChapterOrdinal,
    ChapterTitle,
    CrossOfficeTitle,
    TocItemStart,
    TocItemEnd,
    FindingHeader,
    ReplyHeader,
    DiscussedOffices,
    FindingNumber,
    ReplyNumberRange,
}

impl Marker {
    #[must_use]
    pub fn pattern(self) -> &'static Regex {
        match self {
            Self::TocHeader => &*TOC_HEADER_RE,
            Self::FirstChapter => &*FIRST_CHAPTER_RE,
            Self::Summary => &*SUMMARY_RE,
            Self::ChapterOrdinal => &*CHAPTER_ORDINAL_RE,
            Self::ChapterTitle => &*CHAPTER_TITLE_RE,
            Self::CrossOfficeTitle => &*CROSS_OFFICE_TITLE_RE,
            Self::TocItemStart => &*TOC_ITEM_START_RE,
            Self::TocItemEnd => &*TOC_ITEM_END_RE,
            Self::FindingHeader => &*FINDING_HEADER_RE,
            Self::ReplyHeader => &*REPLY_HEADER_RE,
            Self::DiscussedOffices => &*DISCUSSED_OFFICES_RE,
            Self::FindingNumber => &*FINDING_NUMBER_RE,
            Self::ReplyNumberRange => &*REPLY_NUMBER_RANGE_RE,
        }
    }

    #[must_use]
    pub fn is_match(self, text: &str) -> bool {
        self.pattern().is_match(text.trim())
    }
}

/// Chapter ordinal word with an optional title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterHeading<'a> {
    pub ordinal: &'a str,
    pub title: Option<&'a str>,
}

/// A table-of-contents entry split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocEntry<'a> {
    pub number: Option<u32>,
    pub title: &'a str,
    pub page: Option<u32>,
}

/// Reply numbering: `N` or `N-M`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl NumberRange {
    #[must_use]
    pub const fn single(start: u32) -> Self {
        Self { start, end: None }
    }

    /// Swap the bounds when the range was written backwards
    #[must_use]
    pub fn normalized(self) -> Self {
        match self.end {
            Some(end) if end < self.start => Self {
                start: end,
                end: Some(self.start),
            },
            _ => self,
        }
    }

    /// Distance between the bounds, zero for a single number or a backwards
    /// range
    #[must_use]
    pub fn span(&self) -> u32 {
        self.end.map_or(0, |end| end.saturating_sub(self.start))
    }

    /// Every number covered, bounds inclusive. A backwards range, or one
    /// wider than `max_span`, covers only its start.
    #[must_use]
    pub fn numbers(&self, max_span: u32) -> Vec<u32> {
        match self.end {
            Some(end) if end >= self.start && self.span() <= max_span => {
                (self.start..=end).collect()
            }
            _ => vec![self.start],
        }
    }
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> Option<&'a str> {
    caps.get(index)
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty())
}

fn number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    group(caps, index).and_then(|digits| digits.parse().ok())
}

fn heading<'a>(re: &Regex, text: &'a str) -> Option<ChapterHeading<'a>> {
    let caps = re.captures(text)?;
    Some(ChapterHeading {
        ordinal: group(&caps, 1)?,
        title: group(&caps, 2),
    })
}

fn entry<'a>(re: &Regex, text: &'a str, number_group: Option<usize>) -> Option<TocEntry<'a>> {
    let caps = re.captures(text)?;
    let (title_group, page_group) = if number_group.is_some() { (2, 3) } else { (1, 2) };
    Some(TocEntry {
        number: number_group.and_then(|index| number(&caps, index)),
        title: group(&caps, title_group)?,
        page: number(&caps, page_group),
    })
}

#[must_use]
pub fn is_toc_header(text: &str) -> bool {
    Marker::TocHeader.is_match(text)
}

#[must_use]
pub fn is_first_chapter(text: &str) -> bool {
    Marker::FirstChapter.is_match(text)
}

#[must_use]
pub fn is_summary(text: &str) -> bool {
    Marker::Summary.is_match(text)
}

#[must_use]
pub fn is_finding_header(text: &str) -> bool {
    Marker::FindingHeader.is_match(text)
}

#[must_use]
pub fn is_reply_header(text: &str) -> bool {
    Marker::ReplyHeader.is_match(text)
}

/// Ordinal word of a line holding nothing but "chapter <ordinal>"
#[must_use]
pub fn chapter_ordinal(text: &str) -> Option<&str> {
    Marker::ChapterOrdinal
        .pattern()
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// "chapter <ordinal> - <title>"
#[must_use]
pub fn chapter_title(text: &str) -> Option<ChapterHeading<'_>> {
    heading(Marker::ChapterTitle.pattern(), text.trim())
}

/// "chapter <ordinal> - <cross-office title>"
#[must_use]
pub fn cross_office_title(text: &str) -> Option<ChapterHeading<'_>> {
    heading(Marker::CrossOfficeTitle.pattern(), text.trim())
}

/// Lenient split of any chapter line into ordinal and optional title, used
/// when assembling chapter records
#[must_use]
pub fn chapter_heading(text: &str) -> Option<ChapterHeading<'_>> {
    heading(&CHAPTER_HEADING_RE, text.trim())
}

/// Numbered TOC entry start
#[must_use]
pub fn toc_item_start(text: &str) -> Option<TocEntry<'_>> {
    entry(Marker::TocItemStart.pattern(), text.trim(), Some(1))
}

/// Lenient split of a (joined) TOC entry: number and page are optional
#[must_use]
pub fn toc_entry(text: &str) -> Option<TocEntry<'_>> {
    entry(&TOC_ENTRY_RE, text.trim(), Some(1))
}

#[must_use]
pub fn has_page_leader(text: &str) -> bool {
    Marker::TocItemEnd.is_match(text)
}

#[must_use]
pub fn looks_like_list_item(text: &str) -> bool {
    Marker::TocItemStart.is_match(text) || has_page_leader(text)
}

/// Office names following a "controlled bodies:" marker; empty when the
/// names start on the next line
#[must_use]
pub fn discussed_offices(text: &str) -> Option<&str> {
    Marker::DiscussedOffices
        .pattern()
        .captures(text.trim())
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
}

/// Leading finding number and the text after the first whitespace run
#[must_use]
pub fn leading_number(text: &str) -> Option<(u32, &str)> {
    let caps = Marker::FindingNumber.pattern().captures(text)?;
    Some((number(&caps, 1)?, group(&caps, 2).unwrap_or("")))
}

/// Leading `N` or `N-M` reply numbering and the text after it
#[must_use]
pub fn leading_range(text: &str) -> Option<(NumberRange, &str)> {
    let caps = Marker::ReplyNumberRange.pattern().captures(text)?;
    let range = NumberRange {
        start: number(&caps, 1)?,
        end: number(&caps, 2),
    };
    Some((range, group(&caps, 3).unwrap_or("")))
}

//! Table-of-contents boundary detection and TOC-only tagging.
//!
//! The TOC ends where the first real section heading repeats a heading that
//! was already listed inside the TOC. Two report layouts exist:
//!
//! ```text
//! no summary                         summary
//! ----------                         -------
//! תוכן העניינים   <- header           תוכן העניינים   <- header
//! פרק ראשון       <- first entry      תקצירים......7  <- first entry
//! ...                                ...
//! פרק ראשון       <- end (tagged)     תקצירים         <- end (prefix)
//! ```

use crate::config::TaggerConfig;
use crate::error::{Result, TaggerError};
use crate::markers;
use crate::types::{ReportLines, Tag};
use crate::vocabulary::Vocabulary;
use serde::Serialize;
use std::ops::Range;

/// Which closing rule resolved the TOC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TocVariant {
    /// The first-chapter heading appeared a second time
    FirstChapter,
    /// A line repeated the opening words of the summary entry
    Summary,
}

/// Resolved table-of-contents bounds, all as line indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocBounds {
    /// The TOC header line
    pub header: usize,
    /// First-chapter entry or summary entry inside the TOC
    pub first_entry: usize,
    /// Line that closed the TOC
    pub end: usize,
    /// Whether `end` itself belongs to the TOC range
    pub end_inclusive: bool,
    pub variant: TocVariant,
    /// Summary entry text the end line was matched against
    pub summary_text: Option<String>,
}

impl TocBounds {
    /// Lines owned by the TOC, starting at the header
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let end = if self.end_inclusive {
            self.end + 1
        } else {
            self.end
        };
        self.header..end
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Find and tag the TOC header and the line closing the TOC.
///
/// The scan skips tagged and blank lines and ignores everything before the
/// header.
///
/// Once a summary entry was seen only the summary rule can close the TOC;
/// otherwise the second first-chapter heading does.
pub fn locate(lines: &mut ReportLines, config: &TaggerConfig) -> Result<TocBounds> {
    let mut header: Option<usize> = None;
    let mut first_chapter: Option<usize> = None;
    let mut summary: Option<(usize, String)> = None;
    let mut resolved: Option<TocBounds> = None;

    for index in 0..lines.len() {
        if lines.tag(index).is_tagged() {
            continue;
        }
        let text = lines.trimmed(index);
        if text.is_empty() {
            continue;
        }

        let Some(header_index) = header else {
            if markers::is_toc_header(text) {
                lines.assign(index, Tag::TocHeader);
                header = Some(index);
            }
            continue;
        };

        if let Some((summary_index, summary_text)) = &summary {
            if summary_text.starts_with(text) {
                resolved = Some(TocBounds {
                    header: header_index,
                    first_entry: *summary_index,
                    end: index,
                    end_inclusive: false,
                    variant: TocVariant::Summary,
                    summary_text: Some(summary_text.clone()),
                });
                break;
            }
            continue;
        }

        if markers::is_summary(text) {
            summary = Some((index, text.to_string()));
            continue;
        }

        if markers::is_first_chapter(text) {
            match first_chapter {
                None => first_chapter = Some(index),
                Some(first_entry) => {
                    lines.assign(index, Tag::ChapterHeader);
                    resolved = Some(TocBounds {
                        header: header_index,
                        first_entry,
                        end: index,
                        end_inclusive: true,
                        variant: TocVariant::FirstChapter,
                        summary_text: None,
                    });
                    break;
                }
            }
        }
    }

    let Some(bounds) = resolved else {
        return Err(TaggerError::BoundaryNotFound {
            header_found: header.is_some(),
            lines_scanned: lines.len(),
        });
    };

    if bounds.variant == TocVariant::FirstChapter && config.reject_repeated_first_chapter {
        if let Some(repeat) = ((bounds.end + 1)..lines.len())
            .find(|&index| markers::is_first_chapter(lines.trimmed(index)))
        {
            return Err(TaggerError::RuntimeFault {
                line: repeat,
                occurrences: 3,
            });
        }
    }

    log::debug!(
        "TOC resolved by {:?}: header={}, first_entry={}, end={}",
        bounds.variant,
        bounds.header,
        bounds.first_entry,
        bounds.end
    );

    Ok(bounds)
}

/// Tag office names listed inside the TOC
pub fn tag_office_names(lines: &mut ReportLines, toc: &TocBounds, vocabulary: &Vocabulary) -> usize {
    let mut tagged = 0;
    for index in lines.untagged_in(toc.range()) {
        if vocabulary.is_office(lines.trimmed(index)) && lines.assign(index, Tag::TocChapterOffice) {
            tagged += 1;
        }
    }
    tagged
}

/// Tag chapter ordinals and chapter titles inside the TOC.
///
/// A line right after an office line never opens or continues a title: it is
/// the first entry of that office.
pub fn tag_chapter_titles(lines: &mut ReportLines, toc: &TocBounds) -> usize {
    let mut tagged = 0;
    for index in lines.untagged_in(toc.range()) {
        let previous = lines.prev_tag(index);
        if previous == Tag::TocChapterOffice {
            continue;
        }

        let text = lines.trimmed(index);
        let tag = if markers::chapter_ordinal(text).is_some() {
            Tag::TocChapterNumber
        } else if markers::cross_office_title(text).is_some() {
            Tag::TocChapterCrossOffice
        } else if markers::chapter_title(text).is_some() {
            Tag::TocChapterTitleStart
        } else if previous == Tag::TocChapterTitleStart && !markers::looks_like_list_item(text) {
            Tag::TocChapterTitleContinue
        } else {
            continue;
        };

        if lines.assign(index, tag) {
            tagged += 1;
        }
    }
    tagged
}

/// Tag TOC entries.
///
/// A numbered line opens an entry. Lines after an open entry continue it
/// until a line carrying the dotted page leader closes it. A leader line with
/// no open entry is a single-line, unnumbered entry.
pub fn tag_items(lines: &mut ReportLines, toc: &TocBounds) -> usize {
    let mut tagged = 0;
    for index in lines.untagged_in(toc.range()) {
        let text = lines.trimmed(index);
        let previous = lines.prev_tag(index);
        let entry_open = matches!(previous, Tag::TocItemStart | Tag::TocItemContinue)
            && !markers::has_page_leader(lines.trimmed(index - 1));

        let tag = if markers::toc_item_start(text).is_some() {
            Tag::TocItemStart
        } else if entry_open {
            Tag::TocItemContinue
        } else if markers::has_page_leader(text) {
            Tag::TocItemStart
        } else {
            continue;
        };

        if lines.assign(index, tag) {
            tagged += 1;
        }
    }
    tagged
}

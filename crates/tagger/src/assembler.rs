//! Token group assembler.
//!
//! One forward scan groups every start tag with the continuation tags that
//! follow it, then extracts typed fields from each group:
//!
//! ```text
//! FindingHeader        "ליקוי"             -> Text
//! FindingBodyStart     "2. הועלה כי ..."   -> Finding { number: 2, body }
//! FindingBodyContinue  "משקפים רק ..."     ┘
//! ReplyBodyStart       "1-2. הרשות ..."    -> Reply { numbers: [1, 2], body }
//! ```
//!
//! Untagged lines never produce a record.

use crate::config::TaggerConfig;
use crate::error::{Result, TaggerError};
use crate::markers::{self, NumberRange};
use crate::types::{Line, ReportLines, Tag};
use serde::Serialize;

/// Fields extracted from one group, keyed by the start tag's family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordFields {
    Chapter {
        number: u32,
        title: Option<String>,
    },
    TocItem {
        number: Option<u32>,
        title: String,
        page: Option<u32>,
    },
    Finding {
        number: Option<u32>,
        body: String,
    },
    Reply {
        range: Option<NumberRange>,
        numbers: Vec<u32>,
        body: String,
    },
    Offices {
        names: Vec<String>,
    },
    Office {
        name: String,
    },
    Text {
        body: String,
    },
}

/// An assembled start line plus its continuations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Tag of the group's first line
    pub kind: Tag,
    pub fields: RecordFields,
    /// Group lines joined with newlines
    pub raw_text: String,
    /// First and last line index of the group, both inclusive
    pub start_line: usize,
    pub end_line: usize,
}

impl Record {
    /// Chapter number when this is a chapter record
    #[must_use]
    pub const fn chapter_number(&self) -> Option<u32> {
        match self.fields {
            RecordFields::Chapter { number, .. } => Some(number),
            _ => None,
        }
    }
}

struct Group<'a> {
    start: usize,
    lines: Vec<&'a Line>,
}

impl<'a> Group<'a> {
    fn kind(&self) -> Tag {
        self.lines.first().map_or(Tag::Untagged, |line| line.tag())
    }

    fn first(&self) -> &'a str {
        self.lines.first().map_or("", |line| line.trimmed())
    }

    fn rest(&self) -> impl Iterator<Item = &'a Line> + '_ {
        self.lines.iter().skip(1).copied()
    }

    fn end(&self) -> usize {
        self.start + self.lines.len() - 1
    }

    fn raw_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn joined(&self) -> String {
        collapse(self.lines.iter().map(|line| line.trimmed()))
    }

    /// `head` followed by the verbatim continuation lines
    fn body(&self, head: &str) -> String {
        std::iter::once(head)
            .filter(|head| !head.is_empty())
            .chain(self.rest().map(Line::text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn collapse<'s>(parts: impl Iterator<Item = &'s str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split tagged lines into start/continuation groups, in line order
fn groups(lines: &ReportLines) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if line.tag().is_continuation() {
            if let Some(group) = groups.last_mut() {
                group.lines.push(line);
                continue;
            }
        }
        groups.push(Group {
            start: index,
            lines: vec![line],
        });
    }
    groups
}

/// Assemble every tagged group into a record.
///
/// Fails with [`TaggerError::UnknownOrdinal`] when a chapter group names an
/// ordinal outside the ordinal table; no partial output is returned.
pub fn assemble(lines: &ReportLines, config: &TaggerConfig) -> Result<Vec<Record>> {
    let records = groups(lines)
        .iter()
        .filter(|group| group.kind().is_tagged())
        .map(|group| {
            Ok(Record {
                kind: group.kind(),
                fields: extract(group, config)?,
                raw_text: group.raw_text(),
                start_line: group.start,
                end_line: group.end(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Assembled {} records from {} lines", records.len(), lines.len());
    Ok(records)
}

fn extract(group: &Group<'_>, config: &TaggerConfig) -> Result<RecordFields> {
    let kind = group.kind();

    if kind.is_chapter() {
        return chapter(group);
    }
    if kind.is_office() {
        return Ok(RecordFields::Office {
            name: group.first().to_string(),
        });
    }

    let fields = match kind {
        Tag::TocItemStart => {
            let joined = group.joined();
            match markers::toc_entry(&joined) {
                Some(entry) => RecordFields::TocItem {
                    number: entry.number,
                    title: entry.title.to_string(),
                    page: entry.page,
                },
                None => RecordFields::Text { body: joined },
            }
        }
        Tag::FindingBodyStart => match markers::leading_number(group.first()) {
            Some((number, rest)) => RecordFields::Finding {
                number: Some(number),
                body: group.body(rest),
            },
            None => RecordFields::Finding {
                number: None,
                body: group.body(group.first()),
            },
        },
        Tag::ReplyBodyStart => match markers::leading_range(group.first()) {
            Some((range, rest)) => {
                let range = if config.normalize_reversed_ranges {
                    range.normalized()
                } else {
                    range
                };
                if range.span() > config.max_reply_range_span {
                    log::warn!(
                        "Reply range {}-{} at line {} exceeds span {}, keeping {}",
                        range.start,
                        range.end.unwrap_or(range.start),
                        group.start,
                        config.max_reply_range_span,
                        range.start
                    );
                }
                RecordFields::Reply {
                    numbers: range.numbers(config.max_reply_range_span),
                    range: Some(range),
                    body: group.body(rest),
                }
            }
            None => RecordFields::Reply {
                range: None,
                numbers: Vec::new(),
                body: group.body(group.first()),
            },
        },
        Tag::DiscussedOfficesStart => {
            let joined = group.joined();
            let names = markers::discussed_offices(&joined).unwrap_or(&joined);
            RecordFields::Offices {
                names: split_offices(names),
            }
        }
        Tag::TopicTitleStart => RecordFields::Text {
            body: group.joined(),
        },
        _ => RecordFields::Text {
            body: group.raw_text(),
        },
    };

    Ok(fields)
}

fn chapter(group: &Group<'_>) -> Result<RecordFields> {
    let Some(heading) = markers::chapter_heading(group.first()) else {
        return Err(TaggerError::unknown_ordinal(group.first(), group.start));
    };
    let number = markers::ordinal_value(heading.ordinal)
        .ok_or_else(|| TaggerError::unknown_ordinal(heading.ordinal, group.start))?;

    let title = collapse(
        heading
            .title
            .into_iter()
            .chain(group.rest().map(Line::trimmed)),
    );

    Ok(RecordFields::Chapter {
        number,
        title: (!title.is_empty()).then_some(title),
    })
}

fn split_offices(names: &str) -> Vec<String> {
    names
        .trim()
        .trim_end_matches('.')
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

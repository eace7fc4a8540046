//! Flat documents handed to the search index.

use crate::assembler::{Record, RecordFields};
use crate::types::Tag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Finding,
    Reply,
}

/// One finding or reply with the report context it appeared under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub report_id: String,
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_numbers: Vec<u32>,
    pub body: String,
}

#[derive(Default)]
struct Context {
    chapter: Option<u32>,
    office: Option<String>,
    topic: Option<String>,
    reply_office: Option<String>,
}

impl Context {
    fn observe(&mut self, record: &Record) {
        match (record.kind, &record.fields) {
            (Tag::ChapterHeader | Tag::ChapterNumber, RecordFields::Chapter { number, .. }) => {
                self.chapter = Some(*number);
                self.office = None;
                self.topic = None;
            }
            (Tag::ChapterOfficeName, RecordFields::Office { name }) => {
                self.office = Some(name.clone());
                self.topic = None;
            }
            (Tag::TopicTitleStart, RecordFields::Text { body }) => {
                self.topic = Some(body.clone());
            }
            (Tag::ReplyHeader, _) => self.reply_office = None,
            (Tag::ReplyOfficeName, RecordFields::Office { name }) => {
                self.reply_office = Some(name.clone());
            }
            _ => {}
        }
    }

    fn document(&self, report_id: &str, kind: DocumentKind, body: &str) -> IndexDocument {
        let office = match kind {
            DocumentKind::Reply => self.reply_office.clone().or_else(|| self.office.clone()),
            DocumentKind::Finding => self.office.clone(),
        };
        IndexDocument {
            report_id: report_id.to_string(),
            kind,
            chapter_number: self.chapter,
            office,
            topic: self.topic.clone(),
            finding_number: None,
            reply_numbers: Vec::new(),
            body: body.to_string(),
        }
    }
}

/// Flatten assembled records into finding and reply documents.
///
/// Chapter, office and topic records only update the running context; TOC
/// records never reach the index.
#[must_use]
pub fn index_documents(report_id: &str, records: &[Record]) -> Vec<IndexDocument> {
    let mut context = Context::default();
    let mut documents = Vec::new();

    for record in records {
        context.observe(record);
        match &record.fields {
            RecordFields::Finding { number, body } => documents.push(IndexDocument {
                finding_number: *number,
                ..context.document(report_id, DocumentKind::Finding, body)
            }),
            RecordFields::Reply { numbers, body, .. } => documents.push(IndexDocument {
                reply_numbers: numbers.clone(),
                ..context.document(report_id, DocumentKind::Reply, body)
            }),
            _ => {}
        }
    }

    log::debug!(
        "Report {report_id}: {} index documents from {} records",
        documents.len(),
        records.len()
    );
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: Tag, fields: RecordFields) -> Record {
        Record {
            kind,
            fields,
            raw_text: String::new(),
            start_line: 0,
            end_line: 0,
        }
    }

    fn office(kind: Tag, name: &str) -> Record {
        record(
            kind,
            RecordFields::Office {
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn test_context_follows_records() {
        let records = vec![
            record(
                Tag::TocChapterNumber,
                RecordFields::Chapter {
                    number: 2,
                    title: None,
                },
            ),
            record(
                Tag::ChapterHeader,
                RecordFields::Chapter {
                    number: 1,
                    title: None,
                },
            ),
            office(Tag::ChapterOfficeName, "רשות המסים"),
            record(
                Tag::TopicTitleStart,
                RecordFields::Text {
                    body: "מיסוי הכנסות".to_string(),
                },
            ),
            record(
                Tag::FindingBodyStart,
                RecordFields::Finding {
                    number: Some(1),
                    body: "הועלה כי".to_string(),
                },
            ),
            record(
                Tag::ReplyHeader,
                RecordFields::Text {
                    body: "תגובה".to_string(),
                },
            ),
            office(Tag::ReplyOfficeName, "משרד האוצר"),
            record(
                Tag::ReplyBodyStart,
                RecordFields::Reply {
                    range: None,
                    numbers: vec![1, 2],
                    body: "נמסר כי".to_string(),
                },
            ),
        ];

        let documents = index_documents("67a", &records);
        assert_eq!(documents.len(), 2);

        let finding = &documents[0];
        assert_eq!(finding.kind, DocumentKind::Finding);
        assert_eq!(finding.chapter_number, Some(1));
        assert_eq!(finding.office.as_deref(), Some("רשות המסים"));
        assert_eq!(finding.topic.as_deref(), Some("מיסוי הכנסות"));
        assert_eq!(finding.finding_number, Some(1));

        let reply = &documents[1];
        assert_eq!(reply.kind, DocumentKind::Reply);
        assert_eq!(reply.office.as_deref(), Some("משרד האוצר"));
        assert_eq!(reply.reply_numbers, vec![1, 2]);
        assert_eq!(reply.report_id, "67a");
    }

    #[test]
    fn test_reply_falls_back_to_topic_office() {
        let records = vec![
            office(Tag::ChapterOfficeName, "משרד הבריאות"),
            record(
                Tag::ReplyBodyStart,
                RecordFields::Reply {
                    range: None,
                    numbers: vec![],
                    body: "נמסר".to_string(),
                },
            ),
        ];
        let documents = index_documents("r", &records);
        assert_eq!(documents[0].office.as_deref(), Some("משרד הבריאות"));
        assert_eq!(documents[0].chapter_number, None);
    }

    #[test]
    fn test_serialized_shape_skips_empty_fields() {
        let records = vec![record(
            Tag::FindingBodyStart,
            RecordFields::Finding {
                number: Some(3),
                body: "גוף".to_string(),
            },
        )];
        let json = serde_json::to_value(&index_documents("r", &records)[0]).unwrap();
        assert_eq!(json["kind"], "finding");
        assert_eq!(json["finding_number"], 3);
        assert!(json.get("reply_numbers").is_none());
        assert!(json.get("office").is_none());
    }
}

//! # Report Tagger
//!
//! Line classification for flattened state audit reports.
//!
//! ## Philosophy
//!
//! Reports arrive as plain text with one paragraph per line and no markup.
//! The tagger recovers their structure from a fixed vocabulary of header
//! literals, numbering conventions and per-report office names:
//! - Every line gets at most one tag, written once and never changed
//! - Each pass only looks at untagged lines and the tag of the line before
//! - Lines no rule recognizes stay untagged; that is an accepted outcome
//!
//! ## Architecture
//!
//! ```text
//! Report text + alternate names + preface
//!     │
//!     ├──> Vocabulary Resolver (office names, finding fragments)
//!     │
//!     ├──> TOC Boundary Locator
//!     │    ├─> First-chapter variant / summary variant
//!     │    └─> TOC offices, chapter titles, entries
//!     │
//!     ├──> Body passes (fixed order)
//!     │    ├─> Chapter ordinals, finding and reply headers
//!     │    ├─> Office names, controlled bodies, topic titles
//!     │    └─> Finding bodies, reply bodies
//!     │
//!     └──> Token Group Assembler
//!          ├─> Record[] with typed fields
//!          └─> IndexDocument[] for the search index
//! ```
//!
//! ## Example
//!
//! ```rust
//! use report_tagger::{AlternateNames, ReportPreface, Tagger, TaggerConfig, Vocabulary};
//!
//! let tagger = Tagger::new(TaggerConfig::default()).unwrap();
//! let vocabulary = Vocabulary::resolve(&AlternateNames::default(), &ReportPreface::default());
//!
//! let text = "תוכן העניינים\nפרק ראשון\nפרק ראשון\nליקוי\n1. הועלה כי";
//! let report = tagger.tag_text(text, &vocabulary).unwrap();
//! for record in report.records(tagger.config()).unwrap() {
//!     println!("{} at lines {}-{}", record.kind.as_str(), record.start_line, record.end_line);
//! }
//! ```

mod assembler;
mod batch;
mod config;
mod document;
mod error;
pub mod markers;
mod passes;
mod tagger;
mod toc;
mod types;
mod vocabulary;

pub use assembler::{assemble, Record, RecordFields};
pub use batch::{process_report, report_local_failures, tag_reports, ReportInput, ReportOutput};
pub use config::TaggerConfig;
pub use document::{index_documents, DocumentKind, IndexDocument};
pub use error::{Result, TaggerError};
pub use markers::NumberRange;
pub use passes::Pass;
pub use tagger::{TaggedReport, Tagger};
pub use toc::{TocBounds, TocVariant};
pub use types::{Family, Line, ReportLines, Tag};
pub use vocabulary::{AlternateNames, ReportPreface, Vocabulary};

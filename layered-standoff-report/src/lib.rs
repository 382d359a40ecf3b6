#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Read-only reports over a [`layered_standoff::Document`]: a per-level
//! summary, term frequency tables, keyword-in-context lines and span
//! diagrams for debugging.

mod display;
mod frequency;
mod kwic;
mod summary;

pub use display::LevelDisplay;
pub use frequency::{term_frequencies, FrequencyOptions, FrequencyTable, SortOrder, TermFrequencies};
pub use kwic::{kwic_line, KwicOptions};
pub use summary::{DocumentSummary, LevelSummary};

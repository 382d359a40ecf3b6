use std::sync::Arc;

use layered_standoff::scheme::{AttributeNode, SchemeTree};
use layered_standoff::{AddOptions, AnnotationScheme, Attributes, Document, SpanSet};

use crate::{kwic_line, term_frequencies, DocumentSummary, FrequencyOptions, KwicOptions, SortOrder};

fn new_york() -> Document {
    let mut doc = Document::from_text("New York is big and New York is old");
    doc.add_level("mwe", None).unwrap();
    for span in [["word_0", "word_1"], ["word_5", "word_6"]] {
        doc.add_markable("mwe", SpanSet::single(span), None, AddOptions::default())
            .unwrap();
    }

    let pos: Arc<dyn AnnotationScheme> = Arc::new(SchemeTree::new(vec![
        AttributeNode::nominal("pos", &["noun", "verb"])
            .branch("noun", vec![AttributeNode::nominal("number", &["sg", "pl"])]),
        AttributeNode::free_text("comment"),
    ]));
    doc.add_level("pos", Some(pos)).unwrap();

    let empty: Arc<dyn AnnotationScheme> = Arc::new(SchemeTree::new(Vec::new()));
    doc.add_level("empty", Some(empty)).unwrap();
    doc
}

#[test]
fn test_summary() {
    let doc = new_york();
    insta::assert_snapshot!(DocumentSummary::of(&doc).to_string(), @r###"
    Basedata elements : 9
    Markable levels   :
     mwe              : 2 markables [default: Annotation scheme instance not available!]
     pos              : 0 markables [default: <>pos:noun, comment:]
     empty            : 0 markables [default: none defined]
    "###);
}

#[test]
fn test_kwic_for_query_results() {
    let doc = new_york();
    let level = doc.level("mwe").unwrap();
    let options = KwicOptions::default().with_width(2).with_fill_width(20);

    let lines: Vec<String> = level
        .query(&Attributes::new(), doc.tokens())
        .unwrap()
        .into_iter()
        .map(|m| kwic_line(doc.tokens(), m.spans(), &options).unwrap())
        .collect();

    assert_eq!(
        lines,
        vec![
            "      *B_O_BDATA*_>>New York<<_  is big",
            "          big and_>> New York<<_  is old",
        ]
    );
}

#[test]
fn test_overlay_frequencies_sorted() {
    let doc = new_york();
    let options = FrequencyOptions::default()
        .with_overlay_level("mwe")
        .with_sort(SortOrder::FreqDesc);
    // The second expression renders with its leading space.
    let unstripped = term_frequencies(&doc, &options).unwrap();
    assert_eq!(unstripped.merged.get("new york"), Some(1));
    assert_eq!(unstripped.merged.get(" new york"), Some(1));

    let tf = term_frequencies(&doc, &options.with_strip(true)).unwrap();

    let merged: Vec<(&str, usize)> = tf.merged.entries().iter().map(|(t, c)| (t.as_str(), *c)).collect();
    assert_eq!(
        merged,
        vec![("new york", 2), ("is", 2), ("big", 1), ("and", 1), ("old", 1)]
    );
    assert_eq!(tf.raw.get("york"), Some(2));
    assert_eq!(tf.raw.len(), 6);
}

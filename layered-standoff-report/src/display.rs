use std::collections::HashMap;
use std::fmt::{self, Write};

use layered_standoff::{Markable, MarkableId, MarkableLevel, TokenStream};
use unicode_width::UnicodeWidthStr;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ...
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

type MarkableKey = (String, MarkableId);

struct PointerArrow {
    key: String,
    target: MarkableKey,
}

struct IncludedMarkable {
    key: MarkableKey,
    /// First and last token ordinal of every segment.
    segments: Vec<(usize, usize)>,
    description: String,
    pointers: Vec<PointerArrow>,
    show_pointers: bool,
}

/// Text diagram of markables drawn under the tokens they cover.
///
/// ```text
/// the  old  man  saw  him
/// ╰───────────╯ [A] markable_0
///                     ╰─╯ markable_1 {case=acc}
///                       └─antecedent─>[A]
/// ```
pub struct LevelDisplay<'a> {
    stream: &'a TokenStream,
    include: Vec<IncludedMarkable>,
}

impl<'a> fmt::Display for LevelDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut start_cols = Vec::with_capacity(self.stream.len());
        let mut end_cols = Vec::with_capacity(self.stream.len());

        let mut opening_line = String::new();
        for (idx, token) in self.stream.iter().enumerate() {
            if idx > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            start_cols.push(UnicodeWidthStr::width(opening_line.as_str()));
            opening_line.push_str(token.text());
            end_cols.push(UnicodeWidthStr::width(opening_line.as_str()));
        }
        f.write_str(&opening_line)?;

        let labels = self.build_labels();

        for row in &self.include {
            let first_col = match row.segments.first() {
                Some(&(first, _)) => start_cols[first],
                None => continue,
            };
            f.write_char('\n')?;

            let mut cursor = 0;
            for &(first, last) in &row.segments {
                let start = start_cols[first];
                let end = end_cols[last];
                for _ in cursor..start {
                    f.write_char(' ')?;
                }
                f.write_char('╰')?;
                for _ in (start + 1)..end.saturating_sub(1) {
                    f.write_char('─')?;
                }
                if end - start > 1 {
                    f.write_char('╯')?;
                }
                cursor = end.max(start + 1);
            }

            f.write_char(' ')?;
            if let Some(label) = labels.get(&row.key) {
                write!(f, "{} ", label)?;
            }
            f.write_str(&row.description)?;

            if !row.show_pointers {
                continue;
            }
            for arrow in &row.pointers {
                f.write_char('\n')?;
                for _ in 0..first_col + 2 {
                    f.write_char(' ')?;
                }
                let target = match labels.get(&arrow.target) {
                    Some(label) => label.clone(),
                    None => format!("[{}:{}]", arrow.target.0, arrow.target.1),
                };
                write!(f, "└─{}─>{}", arrow.key, target)?;
            }
        }

        Ok(())
    }
}

impl<'a> LevelDisplay<'a> {
    pub fn new(stream: &'a TokenStream) -> Self {
        LevelDisplay {
            stream,
            include: Vec::new(),
        }
    }

    /// Labels `[A]`, `[B]`, ... for included markables that are the target
    /// of a drawn pointer, in display order.
    fn build_labels(&self) -> HashMap<MarkableKey, String> {
        let targets: Vec<&MarkableKey> = self
            .include
            .iter()
            .filter(|row| row.show_pointers)
            .flat_map(|row| &row.pointers)
            .map(|arrow| &arrow.target)
            .collect();

        let mut labels = HashMap::new();
        for row in &self.include {
            if targets.contains(&&row.key) && !labels.contains_key(&row.key) {
                let label = format!("[{}]", index_to_base26_label(labels.len()));
                labels.insert(row.key.clone(), label);
            }
        }
        labels
    }

    fn push(&mut self, markable: &Markable, show_pointers: bool) {
        let segments = markable
            .spans()
            .segments()
            .iter()
            .filter_map(|segment| {
                let first = self.stream.ordinal(segment.first()?.as_str())?;
                let last = self.stream.ordinal(segment.last()?.as_str())?;
                Some((first, last))
            })
            .collect();

        let pointer_keys: Vec<&str> = markable.pointer_keys().collect();
        let shown: Vec<String> = markable
            .attributes()
            .iter()
            .filter(|(key, _)| !show_pointers || !pointer_keys.contains(&key.as_str()))
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        let description = if shown.is_empty() {
            markable.id().to_string()
        } else {
            format!("{} {{{}}}", markable.id(), shown.join(", "))
        };

        let pointers = pointer_keys
            .iter()
            .flat_map(|&key| {
                markable.pointers(key).iter().map(move |target| PointerArrow {
                    key: key.to_string(),
                    target: (
                        target.resolve_level(markable.level()).to_string(),
                        target.id.clone(),
                    ),
                })
            })
            .collect();

        self.include.push(IncludedMarkable {
            key: (markable.level().to_string(), markable.id().clone()),
            segments,
            description,
            pointers,
            show_pointers,
        });
    }

    /// Draw every markable of `level`, in discourse order.
    pub fn include(&mut self, level: &MarkableLevel) {
        for markable in level.ordered() {
            self.push(markable, false);
        }
    }

    /// Like [`include`](Self::include), with pointer arrows under each markable.
    pub fn include_with_pointers(&mut self, level: &MarkableLevel) {
        for markable in level.ordered() {
            self.push(markable, true);
        }
    }

    pub fn with(mut self, level: &MarkableLevel) -> Self {
        self.include(level);
        self
    }

    pub fn with_pointers(mut self, level: &MarkableLevel) -> Self {
        self.include_with_pointers(level);
        self
    }
}

//! Parses the marker-delimited correction text the LLM returns into styled
//! segments. Corrections arrive as a sentence where changed text is wrapped
//! in 【】, inserted text in 〈〉 and deleted text in ｛｝.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Changed,
    Inserted,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Segment { kind, text: text.into() }
    }
}

/// Scan priority when looking for the next marker. Order is fixed:
/// changed, then inserted, then deleted.
const MARKERS: [(&str, &str, SegmentKind); 3] = [
    ("【", "】", SegmentKind::Changed),
    ("〈", "〉", SegmentKind::Inserted),
    ("｛", "｝", SegmentKind::Deleted),
];

/// Parses one line of correction text into ordered, non-overlapping segments.
///
/// Total over any input: an open delimiter with no matching close degrades
/// to plain text from the delimiter onward. Concatenating every segment's
/// raw span (delimiters included for marked kinds) reconstructs the line.
pub fn parse_line(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        let mut earliest: Option<(usize, &str, &str, SegmentKind)> = None;

        for (open, close, kind) in MARKERS {
            if let Some(idx) = remaining.find(open) {
                if earliest.is_none_or(|(e, ..)| idx < e) {
                    earliest = Some((idx, open, close, kind));
                }
            }
        }

        let Some((open_idx, open, close, kind)) = earliest else {
            segments.push(Segment::new(SegmentKind::Plain, remaining));
            break;
        };

        if open_idx > 0 {
            segments.push(Segment::new(SegmentKind::Plain, &remaining[..open_idx]));
        }

        let after_open = open_idx + open.len();
        let Some(close_rel) = remaining[after_open..].find(close) else {
            // Unterminated marker: keep the rest verbatim, opener included.
            segments.push(Segment::new(SegmentKind::Plain, &remaining[open_idx..]));
            break;
        };

        let close_idx = after_open + close_rel;
        segments.push(Segment::new(kind, &remaining[after_open..close_idx]));
        remaining = &remaining[close_idx + close.len()..];
    }

    segments
}

/// Parses a full correction response, one segment list per line. Markers
/// never span lines.
pub fn parse_correction(text: &str) -> Vec<Vec<Segment>> {
    text.split('\n').map(parse_line).collect()
}

/// The LLM answers a correct sentence with a literal check mark on the
/// first line instead of marked-up text.
pub fn is_correct(response: &str) -> bool {
    response.trim_start().starts_with('✓')
}

use serde::Serialize;

/// A single line in a diff hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: LineType,
    /// 1-based line number in the original file (None for added lines)
    pub old_line: Option<usize>,
    /// 1-based line number in the modified file (None for deleted lines)
    pub new_line: Option<usize>,
    /// 0-based offset of this line within the whole patch body, counted from
    /// the first hunk header and never reset between hunks. Lets a flat
    /// comment-thread position be mapped back to a line in a hunk.
    pub position: usize,
    /// The line as read, marker character included
    pub raw: String,
    /// False when the next patch line is a "no newline at end of file" marker
    pub ends_with_line_break: bool,
}

impl DiffLine {
    /// Line content without its leading diff marker.
    pub fn text(&self) -> &str {
        let mut chars = self.raw.chars();
        chars.next();
        chars.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Context,
    Add,
    Delete,
    /// Hunk headers, "no newline" markers, and anything else without a
    /// recognized marker (including empty lines)
    Control,
}

/// Classify a patch line by its first character.
pub fn classify_line(line: &str) -> LineType {
    match line.as_bytes().first() {
        Some(b' ') => LineType::Context,
        Some(b'+') => LineType::Add,
        Some(b'-') => LineType::Delete,
        _ => LineType::Control,
    }
}

/// One `@@ -a,b +c,d @@` section of a patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    /// Offset of this hunk's header line within the whole patch body
    pub position: usize,
    /// All lines of the hunk in patch order; the header itself is the first
    /// entry, as a Control line
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// The raw `@@` header line.
    pub fn header(&self) -> Option<&str> {
        self.lines
            .first()
            .filter(|l| l.line_type == LineType::Control)
            .map(|l| l.raw.as_str())
    }

    pub fn adds(&self) -> usize {
        self.lines.iter().filter(|l| l.line_type == LineType::Add).count()
    }

    pub fn dels(&self) -> usize {
        self.lines.iter().filter(|l| l.line_type == LineType::Delete).count()
    }
}

/// Count carriage returns embedded in a line's text. A `\r` inside one
/// logical patch line stands for an extra line in the file, so cursors must
/// advance past it.
pub fn count_carriage_returns(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\r').count()
}

/// Parse "start,len" or just "start" (len defaults to 1)
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, len)) = s.split_once(',') {
        Some((start.parse().ok()?, len.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()"
fn parse_hunk_header(line: &str) -> Option<(usize, usize, usize, usize)> {
    let rest = line.strip_prefix("@@ -")?;
    let end = rest.find(" @@")?;
    let (old_part, new_part) = rest[..end].split_once(" +")?;
    let (old_start, old_len) = parse_range(old_part)?;
    let (new_start, new_len) = parse_range(new_part)?;
    Some((old_start, old_len, new_start, new_len))
}

/// Lazy iterator over the hunks of a unified-diff patch body.
///
/// Pure function of its input: parsing the same patch twice yields
/// structurally equal hunks.
pub struct DiffHunkIter<'a> {
    lines: std::str::Lines<'a>,
    open: Option<DiffHunk>,
    /// None until the first hunk header has been seen
    position: Option<usize>,
    old_line: usize,
    new_line: usize,
}

/// Parse a patch body into a lazy sequence of hunks.
pub fn parse_diff_hunks(patch: &str) -> DiffHunkIter<'_> {
    DiffHunkIter {
        lines: patch.lines(),
        open: None,
        position: None,
        old_line: 0,
        new_line: 0,
    }
}

/// Parse a patch body into a Vec of hunks.
pub fn parse_patch(patch: &str) -> Vec<DiffHunk> {
    parse_diff_hunks(patch).collect()
}

impl DiffHunkIter<'_> {
    fn bump_position(&mut self) {
        if let Some(p) = self.position.as_mut() {
            *p += 1;
        }
    }
}

impl Iterator for DiffHunkIter<'_> {
    type Item = DiffHunk;

    fn next(&mut self) -> Option<DiffHunk> {
        while let Some(line) = self.lines.next() {
            if let Some((old_start, old_len, new_start, new_len)) = parse_hunk_header(line) {
                let position = *self.position.get_or_insert(0);
                let hunk = DiffHunk {
                    old_start,
                    old_len,
                    new_start,
                    new_len,
                    position,
                    lines: vec![DiffLine {
                        line_type: LineType::Control,
                        old_line: None,
                        new_line: None,
                        position,
                        raw: line.to_string(),
                        ends_with_line_break: true,
                    }],
                };
                self.old_line = old_start;
                self.new_line = new_start;
                self.bump_position();

                // Flush the previous hunk, keep parsing into the new one
                if let Some(done) = self.open.replace(hunk) {
                    return Some(done);
                }
            } else if let Some(hunk) = self.open.as_mut() {
                let line_type = classify_line(line);
                if line_type == LineType::Control {
                    // "No newline at end of file" and friends: the previous
                    // line has no trailing terminator
                    if let Some(last) = hunk.lines.last_mut() {
                        last.ends_with_line_break = false;
                    }
                } else {
                    let position = self.position.unwrap_or(0);
                    hunk.lines.push(DiffLine {
                        line_type,
                        old_line: if line_type == LineType::Add { None } else { Some(self.old_line) },
                        new_line: if line_type == LineType::Delete { None } else { Some(self.new_line) },
                        position,
                        raw: line.to_string(),
                        ends_with_line_break: true,
                    });

                    let advance = 1 + count_carriage_returns(line);
                    match line_type {
                        LineType::Context => {
                            self.old_line += advance;
                            self.new_line += advance;
                        }
                        LineType::Delete => self.old_line += advance,
                        LineType::Add => self.new_line += advance,
                        LineType::Control => {}
                    }
                }
                self.bump_position();
            } else {
                // Lines before the first hunk header are not part of any hunk
                log::debug!("skipping line outside any hunk: {:?}", line);
            }
        }

        self.open.take()
    }
}

//! Append-only output log with a bottom-anchored viewport.

/// Every echoed command, reply and error, in the order they were appended.
///
/// `scroll_offset` counts lines up from the bottom; `0` means the newest line
/// is in view. Each append snaps the view back to the bottom.
#[derive(Debug, Default, Clone)]
pub struct OutputLog {
    entries: Vec<String>,
    scroll_offset: usize,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        self.scroll_to_bottom();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Entries flattened into display lines. An empty entry still takes a line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|e| e.split('\n'))
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset == 0
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Keep the view from scrolling past the oldest line.
    pub fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

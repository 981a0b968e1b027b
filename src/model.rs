/// A `KEY=VALUE` assignment parsed from a single line.
///
/// Blank and comment-only lines produce an empty key and an empty value;
/// see [`ParsedLine::is_blank`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLine<'a> {
    pub key: &'a str,
    pub value: String,
}

impl ParsedLine<'_> {
    /// `true` when the line carried no assignment and should be skipped.
    pub fn is_blank(&self) -> bool {
        self.key.is_empty()
    }
}

/// Summary of the load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_existing: usize,
}

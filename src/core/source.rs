use crate::core::edit::{line_col, line_text};

/// Pure position information in a source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }
}

/// Position with the source line it points into, for cargo-style display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub location: SourceLocation,
    pub source_line: String,
}

impl SourceContext {
    pub fn new(location: SourceLocation, source_line: impl Into<String>) -> Self {
        Self {
            location,
            source_line: source_line.into(),
        }
    }

    /// Build a context from a byte offset into `source`.
    pub fn at(file_path: &str, source: &str, offset: usize) -> Self {
        let (line, col) = line_col(source, offset);
        Self::new(
            SourceLocation::new(file_path, line, col),
            line_text(source, offset),
        )
    }

    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_new() {
        let loc = SourceLocation::new("./src/app.vue", 10, 5);
        assert_eq!(loc.file_path, "./src/app.vue");
        assert_eq!(loc.line, 10);
        assert_eq!(loc.col, 5);
    }

    #[test]
    fn test_source_context_at() {
        let source = "let a = 1\nlet b = t('k')\n";
        let ctx = SourceContext::at("./src/a.ts", source, source.find("t(").unwrap());
        assert_eq!(ctx.file_path(), "./src/a.ts");
        assert_eq!(ctx.line(), 2);
        assert_eq!(ctx.col(), 9);
        assert_eq!(ctx.source_line, "let b = t('k')");
    }
}

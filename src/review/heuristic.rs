//! Rule-based code review.
//!
//! [`review`] looks at raw source text and produces a short markdown report.
//! It is deterministic and does no I/O: the same text and reviewer always give
//! the same report.

use lazy_static::lazy_static;
use regex::Regex;

/// Files with more lines than this get a "split it up" suggestion.
pub const LARGE_FILE_LINES: usize = 200;

pub const SUGGEST_LARGE_FILE: &str =
    "The file is large. Consider splitting it into smaller modules.";
pub const SUGGEST_DEBUG_PRINTS: &str =
    "Remove debug print statements (console.log, print, println!, ...) before shipping.";
pub const SUGGEST_TRAILING_WHITESPACE: &str = "Trim trailing whitespace.";
pub const NO_ISSUES: &str = "No obvious issues found. Nice work!";

const TIPS: [&str; 2] = [
    "Keep functions small and focused on a single responsibility.",
    "Add tests for edge cases and error paths.",
];

lazy_static! {
    static ref DEBUG_PRINT_RE: Regex = Regex::new(concat!(
        r"console\.(log|debug)\s*\(",
        r"|\bprint(ln|f)?!?\s*\(",
        r"|System\.out\.print(ln)?\s*\(",
        r"|\bfmt\.Print(ln|f)?\s*\(",
        r"|\bdbg!\s*\(",
        r"|\bvar_dump\s*\(",
        r"|\bputs\s",
    ))
    .unwrap();
    static ref TRAILING_WS_RE: Regex = Regex::new(r"(?m)[ \t]+\r?$").unwrap();
}

/// What the heuristic noticed about a piece of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Findings {
    pub line_count: usize,
    pub has_debug_prints: bool,
    pub has_trailing_whitespace: bool,
}

impl Findings {
    pub fn analyze(source: &str) -> Self {
        Self {
            line_count: source.split('\n').count(),
            has_debug_prints: DEBUG_PRINT_RE.is_match(source),
            has_trailing_whitespace: TRAILING_WS_RE.is_match(source),
        }
    }

    /// Suggestions in report order; never empty.
    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.line_count > LARGE_FILE_LINES {
            out.push(SUGGEST_LARGE_FILE);
        }
        if self.has_debug_prints {
            out.push(SUGGEST_DEBUG_PRINTS);
        }
        if self.has_trailing_whitespace {
            out.push(SUGGEST_TRAILING_WHITESPACE);
        }
        if out.is_empty() {
            out.push(NO_ISSUES);
        }
        out
    }
}

/// Review `source` on behalf of `reviewer` and render the markdown report.
pub fn review(source: &str, reviewer: &str) -> String {
    let findings = Findings::analyze(source);
    render(&findings, reviewer)
}

fn render(findings: &Findings, reviewer: &str) -> String {
    let mut md = String::from("# AI Code Review\n\n");
    md.push_str(&format!("**Reviewer:** {reviewer}\n"));
    md.push_str(&format!("**Lines analyzed:** {}\n\n", findings.line_count));

    md.push_str("## Suggestions\n\n");
    for s in findings.suggestions() {
        md.push_str(&format!("- {s}\n"));
    }

    md.push_str("\n## Tips\n\n");
    for tip in TIPS {
        md.push_str(&format!("- {tip}\n"));
    }
    md
}

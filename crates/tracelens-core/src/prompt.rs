//! Prompt assembly.
//!
//! Pure transformation from (error, trace, assembled context) into the
//! structured text handed to the model. Sections are delimited so the model
//! can tell error, trace, and code apart, and an absent context is stated
//! explicitly rather than silently omitted.

use std::fmt::Write;

use crate::assemble::AssembledContext;

const RULE: &str =
    "================================================================================";

const PREAMBLE: &str = "\
You are an expert debugging assistant. Analyze this error and provide actionable insights.

CRITICAL CONSTRAINTS:
- Base your analysis ONLY on the provided error message, stack trace, and source code context
- DO NOT hallucinate logs, runtime values, or information not provided
- DO NOT make assumptions about code that isn't shown
- Focus on what you can see in the stack trace and source code
";

const ANALYSIS_REQUEST: &str = "\
Please provide:

1. ROOT CAUSE ANALYSIS
   - What is the likely root cause of this error?
   - What evidence from the stack trace and source code supports this?

2. SUGGESTED FIX
   - What specific code changes would fix this error?
   - Include the exact file path and line number(s) where changes are needed

3. PREVENTION STRATEGY
   - How could this error be prevented in the future?
   - What code patterns or practices would help avoid this?

Remember: Base your analysis ONLY on the provided context. Do not invent details.
";

/// Marker emitted when no source context survived fetching/assembly. The
/// orchestrator's confidence heuristic keys off the same condition.
pub const NO_CONTEXT_MARKER: &str = "(No source code context available)";

/// Render the full debugging prompt. Deterministic for identical inputs.
pub fn build_prompt(
    error_message: &str,
    stack_trace: Option<&str>,
    context: &AssembledContext,
) -> String {
    let mut out = String::new();

    out.push_str(PREAMBLE);
    out.push('\n');

    section(&mut out, "ERROR MESSAGE");
    out.push_str(error_message);
    out.push_str("\n\n");

    section(&mut out, "STACK TRACE");
    out.push_str(stack_trace.filter(|t| !t.trim().is_empty()).unwrap_or("(no stack trace provided)"));
    out.push_str("\n\n");

    section(&mut out, "SOURCE CODE CONTEXT");
    if context.is_empty() {
        out.push_str(NO_CONTEXT_MARKER);
        out.push('\n');
        out.push_str("Analyze from the stack trace alone.\n");
    } else {
        out.push('\n');
        for (idx, snippet) in context.snippets.iter().enumerate() {
            let _ = writeln!(out, "--- File {}: {} ---", idx + 1, snippet.path);
            let _ = writeln!(
                out,
                "Lines {}-{} (error at line {}):",
                snippet.start_line(),
                snippet.end_line(),
                snippet.center_line
            );
            out.push('\n');
            for (line_no, text) in &snippet.lines {
                let _ = writeln!(out, "{line_no:>5} | {text}");
            }
            out.push('\n');
        }
    }

    section(&mut out, "ANALYSIS REQUEST");
    out.push_str(ANALYSIS_REQUEST);

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
}

//! Stack trace parsing.
//!
//! Extracts ordered (file, line) frames from raw trace text. Recognized
//! dialects:
//! - Node.js: `at functionName (/path/to/file.js:123:45)` and the bare
//!   `at /path/to/file.js:123:45` form (Windows drive paths included)
//! - Python: `File "/path/to/file.py", line 123, in function_name`
//! - Java: `at com.example.Class.method(Class.java:123)`
//! - A permissive `path.ext:123` fallback for anything else
//!
//! Unrecognized lines are skipped; a malformed trace never fails the parse.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which line pattern a frame was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceDialect {
    Node,
    Python,
    Java,
    Generic,
}

/// A single location in a stack trace, as it appeared in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Raw file reference from the trace (may be absolute or platform-specific).
    pub file: String,

    /// 1-based line number.
    pub line: u32,

    /// Function or method name, when the dialect exposes one.
    pub function: Option<String>,

    /// The dialect the line matched.
    pub dialect: TraceDialect,

    /// The full raw line, kept for logging.
    pub raw: String,
}

struct TraceRegexes {
    node_with_fn: Regex,
    node_bare: Regex,
    python: Regex,
    java: Regex,
    generic: Regex,
}

static REGEXES: LazyLock<TraceRegexes> = LazyLock::new(|| TraceRegexes {
    // "at Route.dispatch (C:\app\router.js:119:3)" - path captured up to the
    // first ":digits:digits)" so it may contain spaces and backslashes.
    node_with_fn: Regex::new(r"at\s+(?:([\w.$<>\[\]]+(?:\s+[\w.$<>\[\]]+)?)\s+)?\((.+?):(\d+):(\d+)\)")
        .expect("node pattern"),
    // "at /path/to/file.js:123:45" without a function name.
    node_bare: Regex::new(r"at\s+(.+?):(\d+):(\d+)(?:\s|$)").expect("node bare pattern"),
    // 'File "/path/to/file.py", line 123, in handler'
    python: Regex::new(r#"File\s+["']([^"']+)["']\s*,\s*line\s+(\d+)(?:\s*,\s*in\s+(\S+))?"#)
        .expect("python pattern"),
    // "at com.example.Class.method(Class.java:123)"
    java: Regex::new(r"at\s+([\w.$]+)\(([^:]+):(\d+)\)").expect("java pattern"),
    // Permissive "path.ext:123" fallback.
    generic: Regex::new(
        r"((?:[A-Za-z]:)?[^\s:]+\.(?:js|py|java|ts|tsx|jsx|go|rs|rb|php)):(\d+)",
    )
    .expect("generic pattern"),
});

/// Parse a raw stack trace into ordered frames, most recent call first
/// (as written in the text).
///
/// Returns an empty Vec for absent, empty, or entirely unrecognized input.
pub fn parse_stack_trace(stack_trace: Option<&str>) -> Vec<StackFrame> {
    let Some(text) = stack_trace else {
        return Vec::new();
    };

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<StackFrame> {
    let re = &*REGEXES;

    if let Some(caps) = re.node_with_fn.captures(line) {
        return Some(StackFrame {
            file: caps[2].trim().to_string(),
            line: caps[3].parse().ok()?,
            function: caps.get(1).map(|m| m.as_str().to_string()),
            dialect: TraceDialect::Node,
            raw: line.to_string(),
        });
    }

    if let Some(caps) = re.node_bare.captures(line) {
        return Some(StackFrame {
            file: caps[1].trim().to_string(),
            line: caps[2].parse().ok()?,
            function: None,
            dialect: TraceDialect::Node,
            raw: line.to_string(),
        });
    }

    if let Some(caps) = re.python.captures(line) {
        return Some(StackFrame {
            file: caps[1].trim().to_string(),
            line: caps[2].parse().ok()?,
            function: caps.get(3).map(|m| m.as_str().to_string()),
            dialect: TraceDialect::Python,
            raw: line.to_string(),
        });
    }

    if let Some(caps) = re.java.captures(line) {
        return Some(StackFrame {
            file: caps[2].trim().to_string(),
            line: caps[3].parse().ok()?,
            function: Some(caps[1].to_string()),
            dialect: TraceDialect::Java,
            raw: line.to_string(),
        });
    }

    if let Some(caps) = re.generic.captures(line) {
        return Some(StackFrame {
            file: caps[1].trim().to_string(),
            line: caps[2].parse().ok()?,
            function: None,
            dialect: TraceDialect::Generic,
            raw: line.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_frame_with_function() {
        let frames = parse_stack_trace(Some("at getUser (/app/src/users.js:45:12)"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "/app/src/users.js");
        assert_eq!(frames[0].line, 45);
        assert_eq!(frames[0].function.as_deref(), Some("getUser"));
        assert_eq!(frames[0].dialect, TraceDialect::Node);
    }

    #[test]
    fn test_parse_node_frame_windows_path() {
        let frames =
            parse_stack_trace(Some(r"at Route.dispatch (C:\app\node\router.js:119:3)"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, r"C:\app\node\router.js");
        assert_eq!(frames[0].line, 119);
    }

    #[test]
    fn test_parse_node_frame_without_function() {
        let frames = parse_stack_trace(Some("at /srv/app/index.js:10:2"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "/srv/app/index.js");
        assert_eq!(frames[0].line, 10);
        assert!(frames[0].function.is_none());
    }

    #[test]
    fn test_parse_python_frame() {
        let frames =
            parse_stack_trace(Some(r#"  File "/srv/app/views.py", line 88, in get_user"#));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "/srv/app/views.py");
        assert_eq!(frames[0].line, 88);
        assert_eq!(frames[0].function.as_deref(), Some("get_user"));
        assert_eq!(frames[0].dialect, TraceDialect::Python);
    }

    #[test]
    fn test_parse_java_frame() {
        let frames =
            parse_stack_trace(Some("at com.example.UserService.find(UserService.java:203)"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "UserService.java");
        assert_eq!(frames[0].line, 203);
        assert_eq!(
            frames[0].function.as_deref(),
            Some("com.example.UserService.find")
        );
        assert_eq!(frames[0].dialect, TraceDialect::Java);
    }

    #[test]
    fn test_multi_line_trace_preserves_order() {
        let trace = "TypeError: Cannot read properties of undefined\n\
                     at getUser (/app/src/users.js:45:12)\n\
                     at handle (/app/src/router.js:19:5)\n\
                     some noise line\n\
                     at /app/src/index.js:3:1";
        let frames = parse_stack_trace(Some(trace));
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].file, "/app/src/users.js");
        assert_eq!(frames[1].file, "/app/src/router.js");
        assert_eq!(frames[2].file, "/app/src/index.js");
    }

    #[test]
    fn test_malformed_lines_are_skipped_not_errors() {
        let frames = parse_stack_trace(Some("not a frame\n???\nat (:::)"));
        assert!(frames.is_empty());
    }

    #[test]
    fn test_absent_trace_yields_empty() {
        assert!(parse_stack_trace(None).is_empty());
        assert!(parse_stack_trace(Some("")).is_empty());
    }

    #[test]
    fn test_generic_fallback() {
        let frames = parse_stack_trace(Some("error raised from handlers/user.go:77"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "handlers/user.go");
        assert_eq!(frames[0].line, 77);
        assert_eq!(frames[0].dialect, TraceDialect::Generic);
    }
}

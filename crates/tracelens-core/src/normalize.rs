//! Stack-trace path normalization.
//!
//! Rewrites file references from stack traces (absolute, platform-specific,
//! build output) into repository-relative paths that the Git provider APIs
//! accept. Normalization is best-effort: it never fails, and callers should
//! still attempt a fetch with whatever comes back.

use crate::domain::RepoConfig;

/// Default root directory names used to locate the repository root inside
/// an absolute path when the project has no explicit hints configured.
const ROOT_INDICATORS: &[&str] = &[
    "src", "lib", "app", "backend", "frontend", "server", "client", "packages", "services",
    "example", "examples",
];

/// Build-output directory prefixes stripped from normalized paths.
const BUILD_PREFIXES: &[&str] = &[
    "dist/", "build/", ".next/", ".nuxt/", "out/", "target/", "bin/", "obj/",
];

/// Tooling/dependency directory prefixes stripped from normalized paths.
const EXCLUDED_PREFIXES: &[&str] = &[".git/", ".vscode/", ".idea/", "venv/", "env/", ".env/"];

/// Normalize a stack-trace file path to a repository-relative path.
///
/// Returns `None` only for empty input; otherwise always produces a
/// best-effort candidate. Idempotent: normalizing an already-normalized
/// path returns it unchanged. Each cut therefore runs before the root-hint
/// cut and anchors on the last matching occurrence, so no step can expose
/// material a second pass would cut further.
pub fn normalize_path(file_path: &str, config: Option<&RepoConfig>) -> Option<String> {
    let trimmed = file_path.trim();
    if trimmed.is_empty() {
        return None;
    }

    let hints: Vec<String> = match config {
        Some(c) => match (&c.root_dir, &c.root_hints) {
            (Some(root), _) => vec![root.clone()],
            (None, Some(hints)) => hints.clone(),
            (None, None) => ROOT_INDICATORS.iter().map(|s| s.to_string()).collect(),
        },
        None => ROOT_INDICATORS.iter().map(|s| s.to_string()).collect(),
    };

    // The repository name inside the path is the most reliable anchor:
    // "C:\Projects\shop\src\cart.js" with repo "shop" -> "src/cart.js".
    let mut path = match config.and_then(|c| cut_after_repo_name(trimmed, &c.repo)) {
        Some(after_repo) => after_repo,
        None => strip_absolute_prefix(trimmed).replace('\\', "/"),
    };
    path = strip_build_prefixes(&path);
    path = strip_excluded_dirs(&path);
    if let Some(from_hint) = cut_at_root_hint(&path, &hints) {
        path = from_hint;
    }

    Some(path.trim_start_matches('/').to_string())
}

/// Cut everything before and including the repository name, matched
/// case-insensitively against whole path segments. The cut anchors on the
/// last occurrence so the output never contains the name again. Returns
/// `None` when the name does not occur.
fn cut_after_repo_name(path: &str, repo_name: &str) -> Option<String> {
    if repo_name.is_empty() {
        return None;
    }
    let normalized = path.replace('\\', "/");
    let lower = normalized.to_ascii_lowercase();
    let needle = repo_name.to_ascii_lowercase();

    let mut cut = None;
    let mut search = 0;
    while let Some(rel) = lower[search..].find(&needle) {
        let start = search + rel;
        let end = start + needle.len();
        let starts_segment = start == 0 || lower.as_bytes()[start - 1] == b'/';
        let ends_segment = end == lower.len() || lower.as_bytes()[end] == b'/';
        if starts_segment && ends_segment {
            cut = Some(end);
        }
        search = start + 1;
    }

    let after = normalized[cut?..].trim_start_matches('/').to_string();
    if after.is_empty() {
        None
    } else {
        Some(after)
    }
}

/// Drop a Windows drive marker or a leading Unix root. Deep absolute Unix
/// paths with no recognizable root keep only their last four segments.
fn strip_absolute_prefix(path: &str) -> String {
    let bytes = path.as_bytes();
    if bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
    {
        return path[3..].to_string();
    }

    if let Some(rest) = path.strip_prefix('/') {
        let parts: Vec<&str> = rest.split('/').collect();
        for (i, part) in parts.iter().enumerate() {
            if ROOT_INDICATORS.contains(part) {
                return parts[i..].join("/");
            }
        }
        if parts.len() > 4 {
            return parts[parts.len() - 4..].join("/");
        }
        return rest.to_string();
    }

    path.to_string()
}

fn strip_build_prefixes(path: &str) -> String {
    strip_leading_prefixes(path, BUILD_PREFIXES)
}

fn strip_excluded_dirs(path: &str) -> String {
    // Dependency paths keep only the part after the innermost node_modules.
    let current = match path.to_ascii_lowercase().rfind("node_modules/") {
        Some(idx) => &path[idx + "node_modules/".len()..],
        None => path,
    };
    strip_leading_prefixes(current, EXCLUDED_PREFIXES)
}

/// Strip matching prefixes until none remain, so nested prefixes like
/// "build/dist/x" collapse in one call.
fn strip_leading_prefixes(path: &str, prefixes: &[&str]) -> String {
    let mut current = path.to_string();
    loop {
        let before = current.len();
        for prefix in prefixes {
            if current.len() > prefix.len() && current[..prefix.len()].eq_ignore_ascii_case(prefix)
            {
                current = current[prefix.len()..].to_string();
            }
        }
        if current.len() == before {
            return current;
        }
    }
}

/// Cut the path at the first segment matching one of the hints
/// (case-insensitive), keeping the matching segment.
fn cut_at_root_hint(path: &str, hints: &[String]) -> Option<String> {
    let parts: Vec<&str> = path.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if hints.iter().any(|h| h.eq_ignore_ascii_case(part)) {
            return Some(parts[i..].join("/"));
        }
    }
    None
}

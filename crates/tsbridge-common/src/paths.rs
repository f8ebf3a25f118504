//! Path normalization helpers shared by the cache and the builder.
//!
//! Every component compares paths by plain string equality, so all paths that
//! enter the cache are expected to be in one canonical shape:
//! - backslashes are replaced with `/`
//! - `.` segments are removed, `..` pops a segment without escaping the root
//! - relative inputs are made absolute against the session's working directory
//!
//! Resolution results are memoized per [`PathNormalizer`]. The cache never
//! evicts; a single build session only ever sees a bounded set of paths.

use rustc_hash::FxHashMap;

/// Replace platform separators with `/`.
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Whether `path` is rooted (`/foo` or a drive-letter path such as `c:/foo`).
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || drive_prefix_len(path).is_some()
}

/// Parent directory of a slash-normalized path, mirroring POSIX `dirname`.
///
/// `dirname("/a/b.ts") == "/a"`, `dirname("/a.ts") == "/"`, and a bare file
/// name yields `"."`.
pub fn parent_dir(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => &trimmed[..idx],
        None => ".",
    }
}

/// Relative path from directory `from` to `to`. Both must be absolute and
/// normalized.
pub fn relative(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').filter(|p| !p.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|p| !p.is_empty()).collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::with_capacity(from_parts.len() + to_parts.len());
    segments.extend(std::iter::repeat_n("..", from_parts.len() - common));
    segments.extend(&to_parts[common..]);
    segments.join("/")
}

/// Resolve `path` against the absolute directory `base` without caching.
pub fn resolve(base: &str, path: &str) -> String {
    let normalized = normalize(path);
    if is_absolute(&normalized) {
        collapse(&normalized)
    } else {
        collapse(&format!("{base}/{normalized}"))
    }
}

fn drive_prefix_len(path: &str) -> Option<usize> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(2)
    } else {
        None
    }
}

/// Collapse `.`/`..`/empty segments of an absolute, slash-normalized path.
fn collapse(path: &str) -> String {
    let (mut out, rest) = match drive_prefix_len(path) {
        Some(len) => (format!("{}/", &path[..len]), &path[len..]),
        None => ("/".to_string(), path),
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    out.push_str(&parts.join("/"));
    out
}

/// Per-session path canonicalizer with a memoized absolute-resolution cache.
///
/// One instance belongs to one build session; it is never shared across
/// unrelated sessions so tests stay isolated.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    cwd: String,
    resolved: FxHashMap<String, String>,
}

impl PathNormalizer {
    /// Create a normalizer resolving relative paths against `cwd`.
    pub fn new(cwd: impl AsRef<str>) -> Self {
        let cwd = normalize(cwd.as_ref());
        let cwd = if is_absolute(&cwd) {
            collapse(&cwd)
        } else {
            collapse(&format!("/{cwd}"))
        };
        Self {
            cwd,
            resolved: FxHashMap::default(),
        }
    }

    /// Create a normalizer rooted at the process working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(cwd.to_string_lossy()))
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// See [`normalize`].
    pub fn normalize(&self, path: &str) -> String {
        normalize(path)
    }

    /// Normalize `path` and make it absolute against the working directory.
    /// The input → output mapping is cached for the lifetime of `self`.
    pub fn resolve_normalize(&mut self, path: &str) -> String {
        if let Some(resolved) = self.resolved.get(path) {
            return resolved.clone();
        }

        let resolved = resolve(&self.cwd, path);
        self.resolved.insert(path.to_string(), resolved.clone());
        resolved
    }

    /// Number of memoized resolutions.
    pub fn cached_len(&self) -> usize {
        self.resolved.len()
    }
}

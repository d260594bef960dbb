//! Path utilities

use std::path::Path;

/// Lexically normalize a path, collapsing `.` and `..` segments.
///
/// Both `/` and `\` are treated as separators and the result always uses `/`.
/// Leading `..` segments of a relative path cannot be collapsed and are kept;
/// `..` directly under the root of an absolute path is dropped. An empty
/// result becomes `.`.
pub fn normalize_lexically(path: &str) -> String {
    let rooted = path.starts_with(['/', '\\']);
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Get the lowercased file extension without its leading dot
pub fn lowercase_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Render a path so the encoder can never mistake it for an option
pub fn as_encoder_operand(path: &str) -> String {
    if path.starts_with('-') {
        format!("./{}", path)
    } else {
        path.to_string()
    }
}

/// Final path component, used for display
pub fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

//! Breadcrumb trail derived from the current path

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
    /// Last crumb; rendered as plain text instead of a link
    pub is_current: bool,
}

/// One crumb per non-empty path segment, each linking to its prefix
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| Breadcrumb {
            name: if index == 0 && *segment == "dashboard" {
                "Dashboard".to_string()
            } else {
                capitalize(segment)
            },
            path: format!("/{}", segments[..=index].join("/")),
            is_current: index == last,
        })
        .collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

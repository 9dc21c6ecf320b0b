use std::collections::BTreeSet;

/// Trim, lowercase and deduplicate tags. Blank entries are dropped.
pub fn normalize_tags(tags: &[String]) -> Result<BTreeSet<String>, TagError> {
    let mut out = BTreeSet::new();
    for tag in tags {
        if let Some(tag) = normalize_tag(tag)? {
            out.insert(tag);
        }
    }
    Ok(out)
}

/// Normalize a single tag (or a query, which is matched against tags).
pub fn normalize_tag(tag: &str) -> Result<Option<String>, TagError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(TagError::ContainsControl);
    }
    Ok(Some(trimmed.to_lowercase()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagError {
    ContainsControl,
}

impl TagError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ContainsControl => "tag contains control characters",
        }
    }
}

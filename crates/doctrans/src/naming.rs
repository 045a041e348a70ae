//! Container-name derivation for the object-storage backend.
//!
//! Storage containers must be 3-63 characters of lowercase alphanumerics and
//! hyphens, start and end alphanumeric, with no consecutive hyphens.
//! `ContainerName` can only be constructed through [`ContainerName::sanitize`]
//! or [`ContainerName::derive`], so a held value always satisfies the rules.

use std::fmt;
use std::path::Path;

/// Letter prepended when a sanitized name would start with a non-alphanumeric.
const FILLER_PREFIX: char = 'c';

/// Suffix appended when a sanitized name falls below the minimum length.
const FILLER_PAD: &str = "xyz";

const MAX_LEN: usize = 63;
const MIN_LEN: usize = 3;

/// A storage container identifier that satisfies the backend naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    /// Sanitizes an arbitrary string into a valid container name.
    ///
    /// Degrades rather than errors: every input, including the empty string,
    /// yields a valid name.
    pub fn sanitize(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        for c in name.to_lowercase().chars() {
            let c = if c == '_' { '-' } else { c };
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
                continue;
            }
            // Stripping disallowed characters can bring hyphens together;
            // collapse runs as they form.
            if c == '-' && out.ends_with('-') {
                continue;
            }
            out.push(c);
        }

        let mut sanitized = out.trim_matches('-').to_string();

        if let Some(first) = sanitized.chars().next() {
            if !first.is_ascii_alphanumeric() {
                sanitized.insert(0, FILLER_PREFIX);
            }
        }

        if sanitized.len() > MAX_LEN {
            sanitized.truncate(MAX_LEN);
            while sanitized.ends_with('-') {
                sanitized.pop();
            }
        }

        if sanitized.len() < MIN_LEN {
            sanitized.push_str(FILLER_PAD);
        }

        Self(sanitized)
    }

    /// Derives the container name for one role of a job, optionally scoped to
    /// a target language.
    ///
    /// Names are namespaced by job id so concurrent jobs never share
    /// containers.
    pub fn derive(job_id: &str, role: &str, language: Option<&str>) -> Self {
        let raw = match language {
            Some(language) => format!("{}-{}-{}", job_id, role, language),
            None => format!("{}-{}", job_id, role),
        };
        Self::sanitize(&raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns only the filename component of a path, for use in span fields
/// where the full directory layout should not leak into traces.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

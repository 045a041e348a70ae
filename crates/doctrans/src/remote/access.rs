//! Credential strategy for granting the translation service storage access.

/// How the remote translation service is granted access to containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// The deployment's ambient identity covers storage access; bare
    /// container URLs are sufficient.
    AmbientIdentity,
    /// Key-based deployments attach a time-limited signed token to every
    /// container URL.
    SignedUrl,
}

/// Permissions requested when signing container access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessScope {
    pub read: bool,
    pub write: bool,
    pub list: bool,
}

impl AccessScope {
    /// Source containers are read by the translation service.
    pub const fn source() -> Self {
        Self {
            read: true,
            write: false,
            list: true,
        }
    }

    /// Target containers are written by the translation service.
    pub const fn target() -> Self {
        Self {
            read: true,
            write: true,
            list: true,
        }
    }

    /// Compact permission string, e.g. `rl` or `rwl`.
    pub fn permissions(&self) -> String {
        let mut out = String::with_capacity(3);
        if self.read {
            out.push('r');
        }
        if self.write {
            out.push('w');
        }
        if self.list {
            out.push('l');
        }
        out
    }
}

//! Transport-level failures reported by platform capabilities.

use thiserror::Error;

/// Failure of a platform round trip.
///
/// "Not found" and "feature disabled" answers are not errors; they arrive as ordinary records
/// and are normalized by the caller. This type only covers requests that failed outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform accepted the request but the call failed.
    #[error("{capability} failed: {message}")]
    Transport {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
        /// Host-provided failure description.
        message: String,
    },
    /// The capability is not wired on the active host.
    #[error("capability unavailable: {capability}")]
    Unavailable {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
}

impl PlatformError {
    /// Builds a [`PlatformError::Transport`] value.
    pub fn transport(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            capability,
            message: message.into(),
        }
    }

    /// Returns the capability label for diagnostics.
    pub const fn capability(&self) -> &'static str {
        match self {
            Self::Transport { capability, .. } | Self::Unavailable { capability } => *capability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_label_and_display_cover_both_variants() {
        let transport = PlatformError::transport("fetchBalance", "port closed");
        assert_eq!(transport.capability(), "fetchBalance");
        assert_eq!(transport.to_string(), "fetchBalance failed: port closed");

        let unavailable = PlatformError::Unavailable {
            capability: "tipSite",
        };
        assert_eq!(unavailable.capability(), "tipSite");
        assert_eq!(unavailable.to_string(), "capability unavailable: tipSite");
    }
}

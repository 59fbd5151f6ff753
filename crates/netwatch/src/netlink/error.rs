//! Error types for netlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code on a synchronous exchange.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Multicast group subscription failed during listener startup.
    #[error("cannot subscribe to multicast group {group}: {source}")]
    Subscription {
        /// The multicast group that could not be joined.
        group: u32,
        /// The underlying socket error.
        source: io::Error,
    },

    /// Generic netlink family lookup failed.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name that was not found.
        name: String,
    },

    /// A required multicast group is missing from a resolved family.
    #[error("multicast group '{group}' not found in family '{family}'")]
    GroupNotFound {
        /// The family that was queried.
        family: String,
        /// The group name that was not found.
        group: String,
    },

    /// Interface index not present in the listener's link cache.
    #[error("link not found: ifindex {ifindex}")]
    LinkNotFound {
        /// The interface index that was not found.
        ifindex: i32,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Error raised by an observer callback, replayed by `pump()`.
    #[error("observer error: {0}")]
    Observer(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Create a kernel error from an errno value (as carried in an
    /// NLMSG_ERROR payload, i.e. negated).
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Wrap an arbitrary error as an observer fault.
    pub fn observer(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Observer(err.into())
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, or a cache miss).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, 2 | 19), // ENOENT=2, ENODEV=19
            Self::LinkNotFound { .. } | Self::FamilyNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, 1 | 13), // EPERM=1, EACCES=13
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-1); // EPERM
        assert!(err.is_permission_denied());
        assert_eq!(err.errno(), Some(1));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::from_errno(-2).is_not_found()); // ENOENT
        assert!(Error::from_errno(-19).is_not_found()); // ENODEV
        assert!(Error::LinkNotFound { ifindex: 42 }.is_not_found());
        assert!(
            Error::FamilyNotFound {
                name: "nl80211".into()
            }
            .is_not_found()
        );
        assert!(!Error::from_errno(-1).is_not_found()); // EPERM
    }

    #[test]
    fn test_error_messages() {
        let err = Error::LinkNotFound { ifindex: 3 };
        assert_eq!(err.to_string(), "link not found: ifindex 3");

        let err = Error::GroupNotFound {
            family: "nl80211".into(),
            group: "scan".into(),
        };
        assert_eq!(
            err.to_string(),
            "multicast group 'scan' not found in family 'nl80211'"
        );
    }

    #[test]
    fn test_observer_wrap() {
        let err = Error::observer("observer gave up");
        assert!(err.to_string().contains("observer gave up"));
        assert!(err.errno().is_none());
    }
}

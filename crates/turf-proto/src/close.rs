//! Close-code classification.
//!
//! The server reserves application close codes in the 4000 range. Membership
//! denial has to be told apart from ordinary disconnects so the UI can say
//! "you are not a member" instead of "network error".

/// Normal closure.
pub const NORMAL: u16 = 1000;

/// Credential missing or invalid.
pub const UNAUTHORIZED: u16 = 4401;

/// Caller is not a member of the room.
pub const MEMBERSHIP_DENIED: u16 = 4403;

/// Why a live connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Clean close (1000) initiated by either side.
    Normal,
    /// Server refused the room (4403).
    MembershipDenied,
    /// Server refused the credential (4401).
    Unauthorized,
    /// Any other close code.
    Other(u16),
    /// Connection dropped without a close frame, or failed to open.
    Abnormal,
}

impl CloseReason {
    /// Classify a close code. `None` means no close frame was received.
    pub fn from_code(code: Option<u16>) -> Self {
        match code {
            None => Self::Abnormal,
            Some(NORMAL) => Self::Normal,
            Some(MEMBERSHIP_DENIED) => Self::MembershipDenied,
            Some(UNAUTHORIZED) => Self::Unauthorized,
            Some(other) => Self::Other(other),
        }
    }

    /// Whether the server rejected the caller (retrying cannot succeed
    /// without a different credential or membership).
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::MembershipDenied | Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_reserved_codes() {
        assert_eq!(CloseReason::from_code(Some(4403)), CloseReason::MembershipDenied);
        assert_eq!(CloseReason::from_code(Some(4401)), CloseReason::Unauthorized);
        assert_eq!(CloseReason::from_code(Some(1000)), CloseReason::Normal);
        assert_eq!(CloseReason::from_code(Some(1011)), CloseReason::Other(1011));
        assert_eq!(CloseReason::from_code(None), CloseReason::Abnormal);
    }

    #[test]
    fn only_denials_are_rejections() {
        assert!(CloseReason::MembershipDenied.is_rejection());
        assert!(CloseReason::Unauthorized.is_rejection());
        assert!(!CloseReason::Abnormal.is_rejection());
        assert!(!CloseReason::Other(4000).is_rejection());
    }
}

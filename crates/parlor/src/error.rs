//! Unified error type for the parlor server binary.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_session::SessionError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `parlor` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, lookup).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Transport(_)));
        assert!(parlor_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::AuthFailed("nope".into());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Unavailable(RoomId("AB12CD".into()));
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Room(_)));
    }
}

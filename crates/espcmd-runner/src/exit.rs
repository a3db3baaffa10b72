//! Process exit statuses.
//!
//! Every session result and every failure class before a session has its own
//! status so scripts can tell an unresponsive device from one that rejected
//! the command.

use espcmd_protocol::SessionResult;

/// The device answered `OK`.
pub const SUCCESS: u8 = 0;
/// Bad arguments or an invalid command.
pub const USAGE: u8 = 2;
/// The configuration could not be loaded or the channel could not be opened.
pub const CONFIG: u8 = 3;
/// The channel failed while sending or reading.
pub const TRANSPORT_ERROR: u8 = 4;
/// No final result line within the timeout.
pub const TRANSPORT_TIMEOUT: u8 = 5;
/// The device answered `ERROR`.
pub const PROTOCOL_ERROR: u8 = 6;
/// The device answered `FAIL`.
pub const PROTOCOL_FAIL: u8 = 7;

/// Exit status for a finished session.
pub fn for_result(result: SessionResult) -> u8 {
    match result {
        SessionResult::Success => SUCCESS,
        SessionResult::ProtocolError => PROTOCOL_ERROR,
        SessionResult::ProtocolFail => PROTOCOL_FAIL,
        SessionResult::TransportTimeout => TRANSPORT_TIMEOUT,
        SessionResult::TransportError => TRANSPORT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_success_is_zero() {
        assert_eq!(for_result(SessionResult::Success), 0);
    }

    #[test]
    fn test_statuses_are_distinct() {
        let results = [
            SessionResult::Success,
            SessionResult::ProtocolError,
            SessionResult::ProtocolFail,
            SessionResult::TransportTimeout,
            SessionResult::TransportError,
        ];
        let mut seen: HashSet<u8> = results.iter().map(|r| for_result(*r)).collect();
        assert_eq!(seen.len(), results.len());

        assert!(seen.insert(USAGE));
        assert!(seen.insert(CONFIG));
    }
}

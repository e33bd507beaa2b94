//! Connection setup with bounded retry, decoupled from real sockets and
//! real sleeping so the retry policy itself can be unit-tested.

use std::net::TcpStream;
use std::time::Duration;

use crate::error::SessionError;

/// Number of connect attempts before giving up.
pub const CONNECT_ATTEMPTS: u32 = 30;

/// Delay between connect attempts.
pub const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Something that can attempt one TCP-like connection to `address:port`.
pub trait Dialer {
    /// The connection type returned on success.
    type Connection;

    /// Attempts a single connection, without retrying.
    fn connect(&mut self, address: &str, port: u16) -> std::io::Result<Self::Connection>;
}

/// Dials real TCP connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Connection = TcpStream;

    fn connect(&mut self, address: &str, port: u16) -> std::io::Result<TcpStream> {
        TcpStream::connect((address, port))
    }
}

/// Something that can pause between attempts.
pub trait Sleeper {
    /// Blocks for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps on the real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Dials `address:port` up to [`CONNECT_ATTEMPTS`] times, pausing
/// [`CONNECT_RETRY_INTERVAL`] between failures, matching the source state
/// machine's `CONNECT` state.
pub fn connect_with_retry<D: Dialer, S: Sleeper>(
    dialer: &mut D,
    sleeper: &mut S,
    address: &str,
    port: u16,
) -> Result<D::Connection, SessionError> {
    let mut last_err = None;
    for attempt in 0..CONNECT_ATTEMPTS {
        match dialer.connect(address, port) {
            Ok(conn) => return Ok(conn),
            Err(err) => {
                last_err = Some(err);
                if attempt + 1 < CONNECT_ATTEMPTS {
                    sleeper.sleep(CONNECT_RETRY_INTERVAL);
                }
            }
        }
    }
    Err(SessionError::Connect {
        address: format!("{address}:{port}"),
        attempts: CONNECT_ATTEMPTS,
        source: last_err.expect("loop runs at least once"),
    })
}

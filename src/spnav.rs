//! Reader for the spacenavd socket protocol.
//!
//! The daemon sends fixed size packets of eight native-endian `i32`s. The
//! first word is the event type (0 motion, 1 press, 2 release); motion
//! packets carry x, y, z, rx, ry, rz and the sampling period, button packets
//! carry the button number.

use crate::native::SpnavPayload;

pub const DEFAULT_SOCKET: &str = "/var/run/spnav.sock";
pub const PACKET_SIZE: usize = 8 * std::mem::size_of::<i32>();

const EVENT_MOTION: i32 = 0;
const EVENT_PRESS: i32 = 1;
const EVENT_RELEASE: i32 = 2;

/// Decode one packet. Unknown event types are protocol errors and yield
/// `None`.
pub fn decode_packet(packet: &[u8; PACKET_SIZE]) -> Option<SpnavPayload> {
    let mut words = [0i32; 8];
    for (word, bytes) in words.iter_mut().zip(packet.chunks_exact(4)) {
        *word = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    match words[0] {
        EVENT_MOTION => Some(SpnavPayload::Motion {
            x: words[1],
            y: words[2],
            z: words[3],
            rx: words[4],
            ry: words[5],
            rz: words[6],
            period: u32::try_from(words[7]).unwrap_or(0),
        }),
        EVENT_PRESS | EVENT_RELEASE => Some(SpnavPayload::Button {
            press: words[0] == EVENT_PRESS,
            bnum: words[1],
        }),
        other => {
            tracing::warn!(event_type = other, "unknown space mouse packet");
            None
        }
    }
}

#[cfg(unix)]
pub use unix::SpnavSource;

#[cfg(unix)]
mod unix {
    use super::{decode_packet, PACKET_SIZE};
    use crate::native::SpnavPayload;
    use anyhow::{Context, Result};
    use std::io::{ErrorKind, Read};
    use std::os::unix::net::UnixStream;
    use std::path::Path;

    /// Non-blocking connection to the space mouse daemon.
    #[derive(Debug)]
    pub struct SpnavSource {
        stream: Option<UnixStream>,
        pending: Vec<u8>,
    }

    impl SpnavSource {
        pub fn connect(path: &Path) -> Result<Self> {
            let stream = UnixStream::connect(path)
                .with_context(|| format!("connect to space mouse daemon at {}", path.display()))?;
            stream
                .set_nonblocking(true)
                .context("make space mouse socket non-blocking")?;
            tracing::info!(path = %path.display(), "space mouse connected");
            Ok(Self {
                stream: Some(stream),
                pending: Vec::new(),
            })
        }

        pub fn is_connected(&self) -> bool {
            self.stream.is_some()
        }

        /// Read whatever the daemon sent since the last call.
        pub fn poll(&mut self) -> Vec<SpnavPayload> {
            let Some(stream) = self.stream.as_mut() else {
                return Vec::new();
            };

            let mut buf = [0u8; 16 * PACKET_SIZE];
            let mut closed = false;
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => {
                        tracing::warn!("space mouse daemon closed the connection");
                        closed = true;
                        break;
                    }
                    Ok(read) => self.pending.extend_from_slice(&buf[..read]),
                    Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        tracing::warn!(?err, "space mouse read failed");
                        closed = true;
                        break;
                    }
                }
            }
            if closed {
                self.stream = None;
            }

            let complete = self.pending.len() / PACKET_SIZE * PACKET_SIZE;
            let events = self.pending[..complete]
                .chunks_exact(PACKET_SIZE)
                .filter_map(|chunk| {
                    let packet: &[u8; PACKET_SIZE] = chunk.try_into().ok()?;
                    decode_packet(packet)
                })
                .collect();
            self.pending.drain(..complete);
            events
        }
    }
}

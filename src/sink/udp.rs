//! Fire-and-forget UDP datagram sink.
//!
//! Follows spdlog's `include/spdlog/sinks/udp_sink.h` contract directly:
//! sends each formatted record as one best-effort datagram and does not
//! treat a send failure as fatal to the process, only to that one record.

use super::{Sink, SinkCore};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

pub struct UdpSink {
    core: SinkCore,
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    pub fn new(target: impl ToSocketAddrs) -> Result<Self> {
        let target = target
            .to_socket_addrs()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?
            .next()
            .ok_or_else(|| Error::InvalidConfig("no resolvable UDP target address".into()))?;
        let bind_addr: SocketAddr = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" }
            .parse()
            .expect("static bind address is valid");
        let socket = UdpSocket::bind(bind_addr).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(UdpSink { core: SinkCore::new(), socket, target })
    }
}

impl Sink for UdpSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let rendered = self.core.render(record);
        self.socket.send_to(&rendered, self.target).map_err(|e| Error::SinkError(e.to_string()))?;
        Ok(())
    }

    /// UDP is datagram-oriented and fire-and-forget; nothing to flush.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn set_pattern(&self, pattern: &str) {
        self.core.set_pattern(pattern);
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.core.set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.core.set_level(level);
    }

    fn level(&self) -> Level {
        self.core.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn sends_a_datagram_without_error() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(std::time::Duration::from_secs(2))).unwrap();
        let addr = receiver.local_addr().unwrap();

        let sink = UdpSink::new(addr).unwrap();
        sink.set_pattern("{message}");
        let rec = Record::at(Level::Info, SystemTime::now(), "l", "hello", None);
        sink.log(&rec).unwrap();

        let mut buf = [0u8; 256];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).contains("hello"));
    }

    #[test]
    fn rejects_unresolvable_target() {
        assert!(UdpSink::new("256.256.256.256:0").is_err());
    }
}

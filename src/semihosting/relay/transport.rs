/*!
 * Relay Transport
 * The packet channel and main-loop hook the Relayed backend is driven through
 */

use crate::core::limits::ESCAPE_BYTE;
use crate::core::types::RelayResult;
use crate::target::MemoryAccess;

/// Blocking packet channel shared with the outer debug protocol
pub trait Transport: Send {
    /// Send one request packet body
    fn send(&mut self, packet: &str) -> RelayResult<()>;

    /// Block until the next inbound packet arrives
    fn receive(&mut self) -> RelayResult<Vec<u8>>;

    /// Whether `packet` is the link's escape/disconnect signal
    fn is_escape(&self, packet: &[u8]) -> bool {
        packet == [ESCAPE_BYTE]
    }
}

/// Outcome of handing a packet to the main dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    /// Consumed as ordinary protocol traffic
    Handled,
    /// Not understood; the wait continues
    Unhandled,
    /// The front-end went away
    Disconnected,
}

/// The external main loop, invoked for traffic unrelated to the pending call
pub trait PacketHandler: Send {
    /// Process one packet. Memory traffic must go through `access`: while a
    /// call fills a local structure it is routed to the scratch buffer, which
    /// is how the front-end's result lands on the host side.
    fn handle_packet(&mut self, packet: &[u8], access: &mut MemoryAccess<'_>)
        -> PacketDisposition;
}

/// Handler for links that carry no traffic besides relay replies
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreUnrelated;

impl PacketHandler for IgnoreUnrelated {
    fn handle_packet(&mut self, packet: &[u8], _access: &mut MemoryAccess<'_>) -> PacketDisposition {
        tracing::debug!(len = packet.len(), "dropping unrelated packet");
        PacketDisposition::Unhandled
    }
}

//! Datastructures for tracking control-endpoint transfers

use core::cell::Cell;

/// Endpoint 0's packet size is hardcoded into the USB core.
pub const CTRL_PACKET_SIZE: usize = 8;

/// Endpoints addressable by the module.
pub const N_ENDPOINTS: usize = 8;

/// Bookkeeping for one direction of one endpoint.
///
/// At most one transfer is in flight per slot; starting a new transfer
/// resets every field. The driver shares slots between foreground code
/// and the interrupt path without locks, so callers must not start a
/// transfer on a slot whose completion is still pending.
pub struct Transfer {
    /// Caller-owned data, held until completion hands it back
    pub buffer: Cell<Option<&'static mut [u8]>>,
    /// Requested byte count for the whole transfer
    pub total_len: Cell<usize>,
    /// Bytes already staged into hardware; never exceeds `total_len`
    pub queued_len: Cell<usize>,
    /// Maximum packet size for this slot
    pub max_size: Cell<usize>,
    /// A packet shorter than `max_size` has been sent/received
    pub short_packet: Cell<bool>,
    /// A zero-length packet has been emitted
    pub zlp_sent: Cell<bool>,
}

impl Transfer {
    pub const fn new() -> Transfer {
        Transfer {
            buffer: Cell::new(None),
            total_len: Cell::new(0),
            queued_len: Cell::new(0),
            max_size: Cell::new(0),
            short_packet: Cell::new(false),
            zlp_sent: Cell::new(false),
        }
    }

    /// Begin a new transfer of `len` bytes, keeping `max_size`.
    pub fn start(&self, buffer: Option<&'static mut [u8]>, len: usize) {
        self.buffer.set(buffer);
        self.total_len.set(len);
        self.queued_len.set(0);
        self.short_packet.set(false);
        self.zlp_sent.set(false);
    }

    /// Clear the slot entirely, dropping any held buffer.
    pub fn reset(&self, max_size: usize) {
        self.buffer.set(None);
        self.total_len.set(0);
        self.queued_len.set(0);
        self.max_size.set(max_size);
        self.short_packet.set(false);
        self.zlp_sent.set(false);
    }
}

/// Both directions of one endpoint, indexed by `TransferDirection`
/// (OUT = 0, IN = 1).
pub type EndpointSlots = [Transfer; 2];

pub const fn new_endpoint_slots() -> EndpointSlots {
    [Transfer::new(), Transfer::new()]
}

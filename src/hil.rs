//! Interface to USB device controller hardware

/// Errors reported synchronously by controller operations or carried on
/// transfer completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Generic failure
    FAIL,
    /// The endpoint/direction already has a transfer in flight
    BUSY,
    /// Invalid argument
    INVAL,
    /// The operation is not supported by this controller
    NOSUPPORT,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// OUT: host to device
    HostToDevice,
    /// IN: device to host
    DeviceToHost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

/// An endpoint index together with a transfer direction. Each direction
/// of an endpoint is an independent hardware resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EndpointAddress {
    pub index: u8,
    pub direction: TransferDirection,
}

impl EndpointAddress {
    pub const fn new(index: u8, direction: TransferDirection) -> EndpointAddress {
        EndpointAddress { index, direction }
    }
}

/// The subset of a USB endpoint descriptor a controller needs in order
/// to configure an endpoint.
#[derive(Copy, Clone, Debug)]
pub struct EndpointDescriptor {
    pub address: EndpointAddress,
    pub transfer_type: TransferType,
    pub max_packet_size: u16,
    pub interval: u8,
}

/// USB controller interface
pub trait UsbController<'a> {
    fn set_client(&self, client: &'a dyn Client);

    /// Arm the peripheral: enable the module, reset interrupt state,
    /// enable bus-reset detection, and enable the D+ pull-up so the
    /// host can see the device.
    fn initialize(&self);

    /// Restore the interrupt-enable registers saved by the matching
    /// `interrupts_disable`. A call without a preceding disable leaves
    /// the registers untouched.
    fn interrupts_enable(&self);

    /// Save the live interrupt-enable registers and clear them,
    /// suppressing all interrupt sources of the module. Not idempotent:
    /// register changes made between a disable and the matching enable
    /// are lost on restore.
    fn interrupts_disable(&self);

    /// Program the device function address, then start the zero-length
    /// IN status stage that acknowledges the SET_ADDRESS request.
    fn set_address(&self, addr: u8);

    /// Record the active configuration. This peripheral needs no
    /// hardware action.
    fn set_configuration(&self, config: u8);

    /// Configure a non-control endpoint.
    fn endpoint_open(&self, descriptor: &EndpointDescriptor) -> Result<(), ErrorCode>;

    /// Start a transfer of `len` bytes on the given endpoint/direction.
    /// The buffer is held until `Client::transfer_complete` hands it
    /// back; `None` is valid for zero-length transfers. Callers must not
    /// start a transfer on a slot that already has one in flight.
    fn transfer_request(
        &self,
        endpoint: EndpointAddress,
        buffer: Option<&'static mut [u8]>,
        len: usize,
    ) -> Result<(), ErrorCode>;

    fn endpoint_stall(&self, endpoint: EndpointAddress);

    fn endpoint_clear_stall(&self, endpoint: EndpointAddress);

    fn remote_wakeup(&self);
}

/// USB controller client interface. All notifications are delivered from
/// the controller's interrupt path.
pub trait Client {
    /// An 8-byte SETUP packet arrived on endpoint 0. The bytes are valid
    /// only for the duration of this call.
    fn setup_received(&self, setup: &[u8; 8]);

    /// The host reset the bus; all endpoint and transfer state has been
    /// reinitialized.
    fn bus_reset(&self);

    /// A transfer started with `UsbController::transfer_request` has
    /// finished. The caller's buffer is handed back here.
    fn transfer_complete(
        &self,
        endpoint: EndpointAddress,
        buffer: Option<&'static mut [u8]>,
        bytes_transferred: usize,
        result: Result<(), ErrorCode>,
    );
}

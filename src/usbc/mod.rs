//! MSP430x5xx USB device controller

pub mod data;
pub mod registers;

use core::cell::Cell;
use core::cmp::min;

use log::debug;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use self::data::{new_endpoint_slots, EndpointSlots, Transfer, CTRL_PACKET_SIZE, N_ENDPOINTS};
use self::registers::{
    UsbBufferMemory, UsbRegisters, CNF, CTL, EPCNF, EPCNT, EPINT, IFG, PWRCTL, USBKEY,
    USBVECINT_INPUT_ENDPOINT0, USBVECINT_NONE, USBVECINT_OUTPUT_ENDPOINT0, USBVECINT_RSTR,
    USBVECINT_SETUP_PACKET_RECEIVED,
};
use crate::hil::{
    Client, EndpointAddress, EndpointDescriptor, ErrorCode, TransferDirection, UsbController,
};
use crate::support;

/// VBUS and LDO-overload interrupt-enable bits of USBPWRCTL
/// (VBONIE | VBOFFIE | VUOVLIE).
const PWRCTL_IE_MASK: u16 = 0x7000;

/// State for managing the USB module.
///
/// The module has no single "disable all USB interrupts" bit, so the
/// enable registers are saved into mirror cells and cleared instead;
/// see `interrupts_disable`. The mirrors are meaningful only while
/// `masked` is set.
pub struct Usbc<'a> {
    registers: &'static UsbRegisters,
    buffers: &'static UsbBufferMemory,
    client: Cell<Option<&'a dyn Client>>,
    transfers: [EndpointSlots; N_ENDPOINTS],
    setup_packet: Cell<[u8; 8]>,
    oepie_mirror: Cell<u8>,
    iepie_mirror: Cell<u8>,
    ie_mirror: Cell<u8>,
    pwrctl_mirror: Cell<u16>,
    masked: Cell<bool>,
}

impl<'a> Usbc<'a> {
    pub const fn new(
        registers: &'static UsbRegisters,
        buffers: &'static UsbBufferMemory,
    ) -> Usbc<'a> {
        Usbc {
            registers,
            buffers,
            client: Cell::new(None),
            transfers: [
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
                new_endpoint_slots(),
            ],
            setup_packet: Cell::new([0; 8]),
            oepie_mirror: Cell::new(0),
            iepie_mirror: Cell::new(0),
            ie_mirror: Cell::new(0),
            pwrctl_mirror: Cell::new(0),
            masked: Cell::new(false),
        }
    }

    fn transfer(&self, endpoint: EndpointAddress) -> &Transfer {
        &self.transfers[endpoint.index as usize][endpoint.direction as usize]
    }

    /// Handle an interrupt from the USB module.
    ///
    /// Safe to call with foreground reconfiguration in progress as long
    /// as the caller keeps the per-slot exclusive-access convention
    /// described on [`data::Transfer`].
    pub fn handle_interrupt(&self) {
        let regs = self.registers;

        // SETUP is special: it must be checked before the vector read
        // below, which also stops the NAKs on endpoint 0 that a SETUP
        // receipt induces.
        if regs.ifg.is_set(IFG::SETUP) {
            self.handle_setup_packet();
        }

        // Reading USBVECINT acknowledges the reported cause.
        let vector = regs.vecint.get();

        match vector {
            USBVECINT_NONE => {}
            USBVECINT_RSTR => {
                self.bus_reset();
                debug!("usb: bus reset");
                if let Some(client) = self.client.get() {
                    client.bus_reset();
                }
            }
            // Already delivered above; the vector read cleared the NAK
            // on endpoint 0.
            USBVECINT_SETUP_PACKET_RECEIVED => {}
            USBVECINT_INPUT_ENDPOINT0 => self.transmit_packet(0),
            USBVECINT_OUTPUT_ENDPOINT0 => self.receive_packet(0),
            vector => panic!("usb: unhandled interrupt vector {:#04x}", vector),
        }
    }

    fn handle_setup_packet(&self) {
        let mut setup = [0; 8];
        for (byte, reg) in setup.iter_mut().zip(self.buffers.setup_block.iter()) {
            *byte = reg.get();
        }
        self.setup_packet.set(setup);

        if let Some(client) = self.client.get() {
            client.setup_received(&setup);
        }
    }

    /// Reinitialize endpoint 0 after the host reset the bus.
    fn bus_reset(&self) {
        let regs = self.registers;

        // Endpoint 0's packet size is hardcoded into the USB core. Any
        // transfer that was in flight died with the reset.
        for transfer in self.transfers[0].iter() {
            transfer.reset(CTRL_PACKET_SIZE);
        }

        regs.keypid.set(USBKEY);

        // Enable the control endpoint. USBIIE is a guard flag separate
        // from the interrupt-enable mask; both are needed for the
        // endpoint to signal events.
        regs.oepcnf_0.modify(EPCNF::UBME::SET + EPCNF::USBIIE::SET);
        regs.iepcnf_0.modify(EPCNF::UBME::SET + EPCNF::USBIIE::SET);

        regs.oepie.modify(EPINT::EP0::SET);
        regs.iepie.modify(EPINT::EP0::SET);

        // NAK until a setup packet arrives.
        regs.oepcnt_0.modify(EPCNT::NAK::SET);
        regs.iepcnt_0.modify(EPCNT::NAK::SET);

        // Respond to packets.
        regs.ctl.modify(CTL::FEN::SET);

        // The dedicated SETUP and endpoint-0 buffers need no
        // configuration, so it is now safe to accept SETUP packets.
        regs.ie.modify(IFG::SETUP::SET);

        regs.keypid.set(0);
    }

    /// Stage the next IN packet on endpoint 0, or report completion.
    fn transmit_packet(&self, endpoint: u8) {
        let address = EndpointAddress::new(endpoint, TransferDirection::DeviceToHost);
        let transfer = self.transfer(address);
        let total = transfer.total_len.get();
        let queued = transfer.queued_len.get();

        // The transfer ends on the last data byte if the final packet
        // was short, or on the trailing ZLP when every packet was
        // full-length (including the zero-byte case).
        if queued == total && (transfer.short_packet.get() || transfer.zlp_sent.get()) {
            let buffer = transfer.buffer.take();
            if let Some(client) = self.client.get() {
                client.transfer_complete(address, buffer, queued, Ok(()));
            }
            return;
        }

        let regs = self.registers;

        if queued == total {
            // All data is out but the host cannot tell yet: terminate
            // with a zero-length packet.
            transfer.zlp_sent.set(true);
            regs.iepcnt_0
                .modify(EPCNT::CNT.val(0) + EPCNT::NAK::CLEAR);
            return;
        }

        let max_size = transfer.max_size.get();
        let xfer_size = min(max_size, total - queued);

        if let Some(buffer) = transfer.buffer.take() {
            for (reg, byte) in self
                .buffers
                .iep0_buffer
                .iter()
                .zip(&buffer[queued..queued + xfer_size])
            {
                reg.set(*byte);
            }
            transfer.buffer.set(Some(buffer));
        }

        transfer.queued_len.set(queued + xfer_size);
        if xfer_size < max_size {
            transfer.short_packet.set(true);
        }

        // Program the packet length and clear NAK to transmit.
        regs.iepcnt_0
            .modify(EPCNT::CNT.val(xfer_size as u8) + EPCNT::NAK::CLEAR);
    }

    /// Drain a received OUT packet on endpoint 0 into the caller's
    /// buffer, completing the transfer on a short packet or once
    /// `total_len` bytes have arrived.
    fn receive_packet(&self, endpoint: u8) {
        let address = EndpointAddress::new(endpoint, TransferDirection::HostToDevice);
        let transfer = self.transfer(address);
        let regs = self.registers;

        let count = regs.oepcnt_0.read(EPCNT::CNT) as usize;
        let queued = transfer.queued_len.get();

        if let Some(buffer) = transfer.buffer.take() {
            let n = min(count, buffer.len().saturating_sub(queued));
            for (byte, reg) in buffer[queued..queued + n]
                .iter_mut()
                .zip(self.buffers.oep0_buffer.iter())
            {
                *byte = reg.get();
            }
            transfer.buffer.set(Some(buffer));
        }

        transfer.queued_len.set(queued + count);
        if count < transfer.max_size.get() {
            transfer.short_packet.set(true);
        }

        if transfer.short_packet.get() || transfer.queued_len.get() >= transfer.total_len.get() {
            let buffer = transfer.buffer.take();
            if let Some(client) = self.client.get() {
                client.transfer_complete(address, buffer, transfer.queued_len.get(), Ok(()));
            }
        } else {
            // More data expected; accept the next packet.
            regs.oepcnt_0.modify(EPCNT::NAK::CLEAR);
        }
    }
}

impl<'a> UsbController<'a> for Usbc<'a> {
    fn set_client(&self, client: &'a dyn Client) {
        self.client.set(Some(client));
    }

    fn initialize(&self) {
        let regs = self.registers;

        regs.keypid.set(USBKEY);

        // The module must be enabled before the configuration registers
        // accept writes.
        regs.cnf.modify(CNF::USB_EN::SET);

        // Reset interrupt state.
        regs.oepie.set(0);
        regs.iepie.set(0);
        regs.ie.set(0);
        regs.oepifg.set(0);
        regs.iepifg.set(0);
        regs.ifg.set(0);
        regs.pwrctl.modify(
            PWRCTL::VUOVLIE::CLEAR
                + PWRCTL::VBONIE::CLEAR
                + PWRCTL::VBOFFIE::CLEAR
                + PWRCTL::VUOVLIFG::CLEAR
                + PWRCTL::VBONIFG::CLEAR
                + PWRCTL::VBOFFIFG::CLEAR,
        );
        self.oepie_mirror.set(0);
        self.iepie_mirror.set(0);
        self.ie_mirror.set(0);
        self.pwrctl_mirror.set(0);
        self.masked.set(false);

        regs.vecint.set(0);

        // Enable bus-reset detection; endpoint bring-up happens in the
        // reset handler.
        regs.ie.modify(IFG::RSTR::SET);

        // Pull-up: present ourselves to the host.
        regs.cnf.modify(CNF::PUR_EN::SET);

        regs.keypid.set(0);

        debug!("usb: module initialized");
    }

    fn interrupts_enable(&self) {
        support::atomic(|| {
            let regs = self.registers;

            // Restore only if a disable is actually outstanding, so an
            // unpaired enable cannot clobber registers with stale
            // mirror values.
            if self.masked.get() {
                regs.oepie.set(self.oepie_mirror.get());
                regs.iepie.set(self.iepie_mirror.get());
                regs.ie.set(self.ie_mirror.get());
                regs.pwrctl
                    .set(regs.pwrctl.get() | self.pwrctl_mirror.get());
            }

            self.masked.set(false);
        });
    }

    fn interrupts_disable(&self) {
        support::atomic(|| {
            let regs = self.registers;

            self.oepie_mirror.set(regs.oepie.get());
            self.iepie_mirror.set(regs.iepie.get());
            self.ie_mirror.set(regs.ie.get());
            self.pwrctl_mirror.set(regs.pwrctl.get() & PWRCTL_IE_MASK);

            regs.oepie.set(0);
            regs.iepie.set(0);
            regs.ie.set(0);
            regs.pwrctl.modify(
                PWRCTL::VUOVLIE::CLEAR + PWRCTL::VBONIE::CLEAR + PWRCTL::VBOFFIE::CLEAR,
            );

            self.masked.set(true);
        });
    }

    fn set_address(&self, addr: u8) {
        self.registers.funadr.set(addr);
        debug!("usb: address = {}", addr);

        // Respond with status after changing the device address.
        let _ = self.transfer_request(
            EndpointAddress::new(0, TransferDirection::DeviceToHost),
            None,
            0,
        );
    }

    fn set_configuration(&self, _config: u8) {
        // Nothing to do on this module.
    }

    fn endpoint_open(&self, _descriptor: &EndpointDescriptor) -> Result<(), ErrorCode> {
        Err(ErrorCode::NOSUPPORT)
    }

    fn transfer_request(
        &self,
        endpoint: EndpointAddress,
        buffer: Option<&'static mut [u8]>,
        len: usize,
    ) -> Result<(), ErrorCode> {
        self.transfer(endpoint).start(buffer, len);

        if endpoint.index == 0 {
            let regs = self.registers;
            match endpoint.direction {
                TransferDirection::HostToDevice => {
                    // The interrupt will report received data.
                    regs.ctl.modify(CTL::DIR::CLEAR);
                    regs.oepcnt_0.modify(EPCNT::NAK::CLEAR);
                }
                TransferDirection::DeviceToHost => {
                    // The completion interrupt fires only for
                    // transmitted packets, so raise the flag by hand to
                    // stage the first one.
                    regs.ctl.modify(CTL::DIR::SET);
                    regs.iepifg.modify(EPINT::EP0::SET);
                }
            }
        }

        Ok(())
    }

    fn endpoint_stall(&self, _endpoint: EndpointAddress) {}

    fn endpoint_clear_stall(&self, _endpoint: EndpointAddress) {}

    fn remote_wakeup(&self) {}
}

/// Create a driver instance bound to the module's documented register
/// addresses.
///
/// # Safety
///
/// Only one instance may exist, and nothing else may access the USB
/// module's registers or buffer RAM while it does.
pub unsafe fn usb_module<'a>() -> Usbc<'a> {
    Usbc::new(&*registers::USB_BASE, &*registers::USB_BUFFER_BASE)
}

//! Registers of the MSP430x5xx USB module
//!
//! Register map per the MSP430x5xx family user's guide, USB chapter.
//! The module's register file starts at 0x0900; the dedicated endpoint-0
//! and SETUP packet buffers sit at the top of USB buffer RAM.

use tock_registers::register_bitfields;
use tock_registers::registers::{ReadOnly, ReadWrite};

// Base address of the USB module register file.
pub const USB_BASE: *const UsbRegisters = 0x0900 as *const UsbRegisters;

// Base address of the dedicated endpoint-0/SETUP packet buffers.
pub const USB_BUFFER_BASE: *const UsbBufferMemory = 0x23C8 as *const UsbBufferMemory;

/// Value written to USBKEYPID to unlock the configuration registers.
/// Writing any other value locks them again.
pub const USBKEY: u16 = 0x9628;

// Interrupt vector values reported by USBVECINT. Reading the register
// also acknowledges the reported cause.
pub const USBVECINT_NONE: u16 = 0x00;
pub const USBVECINT_INPUT_ENDPOINT0: u16 = 0x12;
pub const USBVECINT_OUTPUT_ENDPOINT0: u16 = 0x14;
pub const USBVECINT_RSTR: u16 = 0x16;
pub const USBVECINT_SETUP_PACKET_RECEIVED: u16 = 0x20;

#[repr(C)]
pub struct UsbRegisters {
    /// Key register, write `USBKEY` to unlock configuration (0x00)
    pub keypid: ReadWrite<u16>,
    /// Module configuration (0x02)
    pub cnf: ReadWrite<u16, CNF::Register>,
    /// PHY control (0x04)
    pub phyctl: ReadWrite<u16>,
    _reserved0: [u8; 2],
    /// Power and VBUS control (0x08)
    pub pwrctl: ReadWrite<u16, PWRCTL::Register>,
    _reserved1: [u8; 6],
    /// PLL control (0x10)
    pub pllctl: ReadWrite<u16>,
    /// PLL divider buffer (0x12)
    pub plldivb: ReadWrite<u16>,
    /// PLL interrupt enables and flags (0x14)
    pub pllir: ReadWrite<u16>,
    _reserved2: [u8; 10],
    /// Input (device-to-host) endpoint 0 configuration (0x20)
    pub iepcnf_0: ReadWrite<u8, EPCNF::Register>,
    /// Input endpoint 0 byte count (0x21)
    pub iepcnt_0: ReadWrite<u8, EPCNT::Register>,
    /// Output (host-to-device) endpoint 0 configuration (0x22)
    pub oepcnf_0: ReadWrite<u8, EPCNF::Register>,
    /// Output endpoint 0 byte count (0x23)
    pub oepcnt_0: ReadWrite<u8, EPCNT::Register>,
    _reserved3: [u8; 10],
    /// Input endpoint interrupt enables (0x2E)
    pub iepie: ReadWrite<u8, EPINT::Register>,
    /// Output endpoint interrupt enables (0x2F)
    pub oepie: ReadWrite<u8, EPINT::Register>,
    /// Input endpoint interrupt flags (0x30)
    pub iepifg: ReadWrite<u8, EPINT::Register>,
    /// Output endpoint interrupt flags (0x31)
    pub oepifg: ReadWrite<u8, EPINT::Register>,
    /// Interrupt vector (0x32)
    pub vecint: ReadWrite<u16>,
    _reserved4: [u8; 2],
    /// Timer maintenance (0x36)
    pub maint: ReadWrite<u16>,
    /// Timestamp (0x38)
    pub tsreg: ReadOnly<u16>,
    /// Frame number (0x3A)
    pub fnum: ReadOnly<u16>,
    /// Module control (0x3C)
    pub ctl: ReadWrite<u8, CTL::Register>,
    /// Module interrupt enables (0x3D)
    pub ie: ReadWrite<u8, IFG::Register>,
    /// Module interrupt flags (0x3E)
    pub ifg: ReadWrite<u8, IFG::Register>,
    /// Device function address (0x3F)
    pub funadr: ReadWrite<u8>,
}

/// Dedicated hardware buffers for endpoint 0 and SETUP packets. These
/// live in USB buffer RAM and need no descriptor setup.
#[repr(C)]
pub struct UsbBufferMemory {
    /// Output endpoint 0 packet buffer (0x23C8)
    pub oep0_buffer: [ReadWrite<u8>; 8],
    /// Input endpoint 0 packet buffer (0x23D0)
    pub iep0_buffer: [ReadWrite<u8>; 8],
    /// SETUP packet block (0x23D8)
    pub setup_block: [ReadWrite<u8>; 8],
}

register_bitfields![u16,
    pub CNF [
        /// Module enable; must be set before configuration writes
        USB_EN OFFSET(0) NUMBITS(1) [],
        /// D+ pull-up enable
        PUR_EN OFFSET(1) NUMBITS(1) [],
        /// D+ pull-up pin input value
        PUR_IN OFFSET(2) NUMBITS(1) [],
        /// Block ready for DMA
        BLKRDY OFFSET(3) NUMBITS(1) [],
        /// Frame number timestamping enable
        FNTEN OFFSET(4) NUMBITS(1) []
    ],
    pub PWRCTL [
        /// USB LDO enable
        VUSBEN OFFSET(0) NUMBITS(1) [],
        /// Secondary LDO enable
        SLDOEN OFFSET(1) NUMBITS(1) [],
        /// Secondary LDO auto-on
        SLDOAON OFFSET(2) NUMBITS(1) [],
        /// Bandgap and VBUS valid
        USBBGVBV OFFSET(3) NUMBITS(1) [],
        /// VBUS detection enable
        USBDETEN OFFSET(4) NUMBITS(1) [],
        /// LDO overload auto-off
        OVLAOFF OFFSET(5) NUMBITS(1) [],
        /// VBUS coming-on interrupt flag
        VBONIFG OFFSET(8) NUMBITS(1) [],
        /// VBUS going-off interrupt flag
        VBOFFIFG OFFSET(9) NUMBITS(1) [],
        /// LDO overload interrupt flag
        VUOVLIFG OFFSET(10) NUMBITS(1) [],
        /// VBUS coming-on interrupt enable
        VBONIE OFFSET(12) NUMBITS(1) [],
        /// VBUS going-off interrupt enable
        VBOFFIE OFFSET(13) NUMBITS(1) [],
        /// LDO overload interrupt enable
        VUOVLIE OFFSET(14) NUMBITS(1) []
    ]
];

register_bitfields![u8,
    pub EPCNF [
        /// UBM endpoint enable
        UBME OFFSET(2) NUMBITS(1) [],
        /// Transaction interrupt indication enable
        USBIIE OFFSET(3) NUMBITS(1) [],
        /// Stall condition
        STALL OFFSET(5) NUMBITS(1) [],
        /// Data toggle
        TOGGLE OFFSET(6) NUMBITS(1) []
    ],
    pub EPCNT [
        /// Packet byte count
        CNT OFFSET(0) NUMBITS(4) [],
        /// Endpoint not ready; cleared to accept/send a packet
        NAK OFFSET(7) NUMBITS(1) []
    ],
    pub EPINT [
        EP0 OFFSET(0) NUMBITS(1) []
    ],
    pub CTL [
        /// Data-stage direction: 1 = IN (device to host)
        DIR OFFSET(0) NUMBITS(1) [],
        /// Function reset connection enable
        FRSTE OFFSET(4) NUMBITS(1) [],
        /// Remote wakeup request
        RWUP OFFSET(5) NUMBITS(1) [],
        /// Function enable; respond to packets
        FEN OFFSET(6) NUMBITS(1) []
    ],
    /// Shared layout of USBIE and USBIFG
    pub IFG [
        /// SETUP overwrite
        STPOW OFFSET(0) NUMBITS(1) [],
        /// SETUP packet received
        SETUP OFFSET(2) NUMBITS(1) [],
        /// Resume
        RESR OFFSET(5) NUMBITS(1) [],
        /// Suspend
        SUSR OFFSET(6) NUMBITS(1) [],
        /// Bus reset
        RSTR OFFSET(7) NUMBITS(1) []
    ]
];

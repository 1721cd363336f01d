//! Peripheral driver for the USB module on MSP430x5xx MCUs.
//!
//! Implements the device side of the control endpoint (endpoint 0):
//! bus-reset handling, SETUP packet delivery, and the IN/OUT transfer
//! engine that moves data through the module's dedicated 8-byte
//! endpoint buffers. Non-control endpoints are not supported.

#![cfg_attr(not(test), no_std)]

pub mod hil;
pub mod support;
pub mod usbc;

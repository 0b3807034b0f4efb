//! Register-addressed bus abstraction
//!
//! A narrow contract for talking to a device over a byte-oriented bus.
//! Drivers are written against [`BusAdapter`] only, so the same driver
//! runs against a real I2C peripheral, the in-memory mock, or any other
//! transport that implements the four primitive operations.
//!
//! Every operation is a single transaction: it either transfers exactly
//! the requested number of bytes or fails. Adapters never retry.

use heapless::Vec;

/// Largest payload a single transfer may carry
pub const MAX_TRANSFER: usize = 32;

/// Bytes returned by a read transfer
pub type Bytes = Vec<u8, MAX_TRANSFER>;

/// Transport-level failure reported by the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte
    Nack,
    /// Another master won arbitration
    ArbitrationLost,
    /// Misplaced start/stop condition
    Bus,
    /// Peripheral could not keep up with the data
    Overrun,
    /// Transfer did not complete within the transport's time limit
    Timeout,
    /// Any other transport failure
    Other,
}

/// Error from a bus adapter operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The transaction failed on the wire
    Bus(BusError),
    /// The request itself was malformed (caller bug)
    InvalidArgument,
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}

/// Byte order used when encoding integers for a register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// Value written to a device register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterValue<'a> {
    /// Integer, encoded into `byte_count` bytes with the requested byte order
    Int(u32),
    /// Raw bytes, written as given; length must equal `byte_count`
    Bytes(&'a [u8]),
}

/// Encode a register value into exactly `byte_count` bytes
///
/// Integers that do not fit and buffers of the wrong length are rejected
/// with [`Error::InvalidArgument`] rather than truncated.
pub fn encode_value(
    value: RegisterValue<'_>,
    byte_count: usize,
    byte_order: ByteOrder,
) -> Result<Bytes, Error> {
    if byte_count > MAX_TRANSFER {
        return Err(Error::InvalidArgument);
    }

    match value {
        RegisterValue::Int(v) => {
            if byte_count < 4 && (v >> (8 * byte_count)) != 0 {
                return Err(Error::InvalidArgument);
            }

            // Build little-endian first, flip for big-endian
            let mut out = Bytes::new();
            for i in 0..byte_count {
                let shift = 8 * i;
                let byte = if shift < 32 { (v >> shift) as u8 } else { 0 };
                out.push(byte).map_err(|_| Error::InvalidArgument)?;
            }
            if byte_order == ByteOrder::Big {
                out.reverse();
            }
            Ok(out)
        }
        RegisterValue::Bytes(buf) => {
            if buf.len() != byte_count {
                return Err(Error::InvalidArgument);
            }
            Bytes::from_slice(buf).map_err(|_| Error::InvalidArgument)
        }
    }
}

/// Register-level access to devices on a byte-oriented bus
///
/// Device addresses are 7-bit. All operations block until the
/// transaction completes or fails; a bounded timeout is the transport's
/// job and surfaces as [`BusError::Timeout`].
pub trait BusAdapter {
    /// Read `byte_count` bytes from register `reg_addr`
    ///
    /// Issues the register address then reads back in one transaction
    /// (repeated start).
    fn read_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        byte_count: usize,
    ) -> Result<Bytes, Error>;

    /// Write `value` to register `reg_addr` as `byte_count` bytes
    fn write_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        value: RegisterValue<'_>,
        byte_count: usize,
        byte_order: ByteOrder,
    ) -> Result<(), Error>;

    /// Raw read of `n_bytes` with no register address phase
    fn read(&mut self, device_addr: u8, n_bytes: usize) -> Result<Bytes, Error>;

    /// Raw write of `buf` with no register address phase
    fn write(&mut self, device_addr: u8, buf: &[u8]) -> Result<(), Error>;

    /// Read register contents into `buf`, sized by the buffer
    fn read_register_into(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let bytes = self.read_register(device_addr, reg_addr, buf.len())?;
        if bytes.len() != buf.len() {
            // Adapter broke the exact-length contract
            return Err(Error::Bus(BusError::Other));
        }
        buf.copy_from_slice(&bytes);
        Ok(())
    }

    /// Write all of `buf` starting at register `reg_addr`
    fn write_register_bytes(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        buf: &[u8],
    ) -> Result<(), Error> {
        self.write_register(
            device_addr,
            reg_addr,
            RegisterValue::Bytes(buf),
            buf.len(),
            ByteOrder::Big,
        )
    }
}

impl<T: BusAdapter + ?Sized> BusAdapter for &mut T {
    fn read_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        byte_count: usize,
    ) -> Result<Bytes, Error> {
        T::read_register(self, device_addr, reg_addr, byte_count)
    }

    fn write_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        value: RegisterValue<'_>,
        byte_count: usize,
        byte_order: ByteOrder,
    ) -> Result<(), Error> {
        T::write_register(self, device_addr, reg_addr, value, byte_count, byte_order)
    }

    fn read(&mut self, device_addr: u8, n_bytes: usize) -> Result<Bytes, Error> {
        T::read(self, device_addr, n_bytes)
    }

    fn write(&mut self, device_addr: u8, buf: &[u8]) -> Result<(), Error> {
        T::write(self, device_addr, buf)
    }
}

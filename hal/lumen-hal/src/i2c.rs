//! I2C bus adapter
//!
//! Implements [`BusAdapter`] on top of any `embedded-hal` 1.0 blocking
//! I2C master, so chip HALs (embassy-rp, rp2040-hal, linux-embedded-hal,
//! ...) plug in without further glue.

use embedded_hal::i2c::{ErrorKind, I2c};
use heapless::Vec;

use crate::bus::{
    encode_value, BusAdapter, BusError, ByteOrder, Bytes, Error, RegisterValue, MAX_TRANSFER,
};

/// Register address byte plus the largest payload
const FRAME_LEN: usize = MAX_TRANSFER + 1;

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusError::Nack,
            ErrorKind::ArbitrationLoss => BusError::ArbitrationLost,
            ErrorKind::Bus => BusError::Bus,
            ErrorKind::Overrun => BusError::Overrun,
            _ => BusError::Other,
        }
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> Error {
    Error::Bus(e.kind().into())
}

/// Zero-filled receive buffer of exactly `len` bytes
fn rx_buffer(len: usize) -> Result<Bytes, Error> {
    let mut buf = Bytes::new();
    buf.resize(len, 0).map_err(|_| Error::InvalidArgument)?;
    Ok(buf)
}

/// Bus adapter over an `embedded-hal` I2C master
///
/// Holds the bus handle it was given. Pass `&mut i2c` to keep ownership
/// of the peripheral with the caller.
pub struct I2cAdapter<I> {
    bus: I,
}

impl<I> I2cAdapter<I> {
    /// Bind the adapter to an I2C bus
    pub fn new(bus: I) -> Self {
        Self { bus }
    }

    /// Give the underlying bus back
    pub fn release(self) -> I {
        self.bus
    }

    /// Direct access to the underlying bus
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.bus
    }
}

impl<I: I2c> BusAdapter for I2cAdapter<I> {
    fn read_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        byte_count: usize,
    ) -> Result<Bytes, Error> {
        let mut buf = rx_buffer(byte_count)?;
        self.bus
            .write_read(device_addr, &[reg_addr], &mut buf)
            .map_err(bus_error)?;
        Ok(buf)
    }

    fn write_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        value: RegisterValue<'_>,
        byte_count: usize,
        byte_order: ByteOrder,
    ) -> Result<(), Error> {
        let data = encode_value(value, byte_count, byte_order)?;

        let mut frame: Vec<u8, FRAME_LEN> = Vec::new();
        frame.push(reg_addr).map_err(|_| Error::InvalidArgument)?;
        frame
            .extend_from_slice(&data)
            .map_err(|_| Error::InvalidArgument)?;

        self.bus.write(device_addr, &frame).map_err(bus_error)
    }

    fn read(&mut self, device_addr: u8, n_bytes: usize) -> Result<Bytes, Error> {
        let mut buf = rx_buffer(n_bytes)?;
        self.bus.read(device_addr, &mut buf).map_err(bus_error)?;
        Ok(buf)
    }

    fn write(&mut self, device_addr: u8, buf: &[u8]) -> Result<(), Error> {
        self.bus.write(device_addr, buf).map_err(bus_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug)]
    struct FakeError(ErrorKind);

    impl embedded_hal::i2c::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Records writes and answers reads with a repeating pattern
    #[derive(Default)]
    struct FakeI2c {
        writes: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
        transactions: usize,
        pattern: [u8; 4],
        fail: Option<ErrorKind>,
    }

    impl ErrorType for FakeI2c {
        type Error = FakeError;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.fail {
                return Err(FakeError(kind));
            }
            self.transactions += 1;
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = self.pattern[i % 4];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_raw_write_passes_bytes_through() {
        let mut adapter = I2cAdapter::new(FakeI2c::default());
        adapter.write(0x23, &[0x10]).unwrap();

        let bus = adapter.release();
        assert_eq!(bus.writes, [(0x23, std::vec![0x10])]);
    }

    #[test]
    fn test_raw_read_returns_exact_count() {
        let mut adapter = I2cAdapter::new(FakeI2c {
            pattern: [0x04, 0xB0, 0xFF, 0xFF],
            ..Default::default()
        });
        let bytes = adapter.read(0x23, 2).unwrap();
        assert_eq!(&bytes[..], &[0x04, 0xB0]);
    }

    #[test]
    fn test_read_register_is_one_transaction() {
        let mut adapter = I2cAdapter::new(FakeI2c {
            pattern: [0xAA, 0xBB, 0xCC, 0xDD],
            ..Default::default()
        });
        let bytes = adapter.read_register(0x50, 0x07, 3).unwrap();
        assert_eq!(&bytes[..], &[0xAA, 0xBB, 0xCC]);

        let bus = adapter.release();
        assert_eq!(bus.transactions, 1);
        assert_eq!(bus.writes, [(0x50, std::vec![0x07])]);
    }

    #[test]
    fn test_write_register_prefixes_address() {
        let mut adapter = I2cAdapter::new(FakeI2c::default());
        adapter
            .write_register(0x50, 0x10, RegisterValue::Int(0x0102), 2, ByteOrder::Little)
            .unwrap();

        let bus = adapter.release();
        assert_eq!(bus.writes, [(0x50, std::vec![0x10, 0x02, 0x01])]);
    }

    #[test]
    fn test_write_register_mismatch_never_hits_bus() {
        let mut adapter = I2cAdapter::new(FakeI2c::default());
        let result =
            adapter.write_register(0x50, 0x10, RegisterValue::Bytes(&[1, 2, 3]), 2, ByteOrder::Big);
        assert_eq!(result, Err(Error::InvalidArgument));
        assert_eq!(adapter.release().transactions, 0);
    }

    #[test]
    fn test_nack_maps_to_bus_error() {
        let mut adapter = I2cAdapter::new(FakeI2c {
            fail: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            ..Default::default()
        });
        assert_eq!(adapter.read(0x23, 2), Err(Error::Bus(BusError::Nack)));
        assert_eq!(adapter.write(0x23, &[0x01]), Err(Error::Bus(BusError::Nack)));
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(BusError::from(ErrorKind::ArbitrationLoss), BusError::ArbitrationLost);
        assert_eq!(BusError::from(ErrorKind::Bus), BusError::Bus);
        assert_eq!(BusError::from(ErrorKind::Overrun), BusError::Overrun);
        assert_eq!(BusError::from(ErrorKind::Other), BusError::Other);
    }

    #[test]
    fn test_read_register_into_fills_buffer() {
        let mut adapter = I2cAdapter::new(FakeI2c {
            pattern: [1, 2, 3, 4],
            ..Default::default()
        });
        let mut buf = [0u8; 4];
        adapter.read_register_into(0x50, 0x00, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }
}

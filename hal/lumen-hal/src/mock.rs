//! In-memory bus for host-side testing
//!
//! [`MockBus`] stands in for a single device at a fixed address. Raw reads
//! are answered from a script of queued responses (then from an optional
//! repeating response), register accesses hit a 256-byte register file,
//! and every transaction is logged so tests can assert exactly what went
//! over the wire.

use heapless::{Deque, Vec};

use crate::bus::{encode_value, BusAdapter, BusError, ByteOrder, Bytes, Error, RegisterValue};

/// Maximum queued raw-read responses
pub const MAX_SCRIPTED: usize = 16;

/// Maximum logged transactions
///
/// Transfers past this still succeed; they are counted in
/// [`MockBus::dropped`] instead of logged.
pub const MAX_LOG: usize = 64;

/// One transaction seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Raw write
    Write { address: u8, bytes: Bytes },
    /// Raw read of `len` bytes
    Read { address: u8, len: usize },
    /// Register write
    WriteRegister { address: u8, reg: u8, bytes: Bytes },
    /// Register read of `len` bytes
    ReadRegister { address: u8, reg: u8, len: usize },
}

/// Simulated single-device bus
pub struct MockBus {
    address: u8,
    registers: [u8; 256],
    responses: Deque<Result<Bytes, BusError>, MAX_SCRIPTED>,
    repeat: Option<Bytes>,
    write_fault: Option<BusError>,
    log: Vec<Transaction, MAX_LOG>,
    dropped: usize,
}

impl MockBus {
    /// Create a bus with one device answering at `address`
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            responses: Deque::new(),
            repeat: None,
            write_fault: None,
            log: Vec::new(),
            dropped: 0,
        }
    }

    /// Queue the bytes returned by the next raw read
    ///
    /// The mock returns them as-is, even if the read asked for a different
    /// count, so short responses can be simulated.
    /// Returns false if the script is full or the response too long.
    pub fn push_response(&mut self, bytes: &[u8]) -> bool {
        match Bytes::from_slice(bytes) {
            Ok(b) => self.responses.push_back(Ok(b)).is_ok(),
            Err(()) => false,
        }
    }

    /// Queue a failure for the next raw read
    pub fn push_read_fault(&mut self, fault: BusError) -> bool {
        self.responses.push_back(Err(fault)).is_ok()
    }

    /// Answer every unscripted raw read with `bytes`
    pub fn set_repeating(&mut self, bytes: &[u8]) -> bool {
        match Bytes::from_slice(bytes) {
            Ok(b) => {
                self.repeat = Some(b);
                true
            }
            Err(()) => false,
        }
    }

    /// Fail the next raw or register write with `fault`
    pub fn fail_next_write(&mut self, fault: BusError) {
        self.write_fault = Some(fault);
    }

    /// Current contents of a register
    pub fn register(&self, reg: u8) -> u8 {
        self.registers[reg as usize]
    }

    /// Preload a register
    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.registers[reg as usize] = value;
    }

    /// All transactions in order
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Payloads of raw writes, in order
    pub fn writes(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.log.iter().filter_map(|t| match t {
            Transaction::Write { bytes, .. } => Some(&bytes[..]),
            _ => None,
        })
    }

    /// Transactions not logged because the log was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forget logged transactions
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.dropped = 0;
    }

    fn record(&mut self, transaction: Transaction) {
        if self.log.push(transaction).is_err() {
            self.dropped += 1;
        }
    }

    fn check_address(&self, device_addr: u8) -> Result<(), Error> {
        if device_addr == self.address {
            Ok(())
        } else {
            Err(Error::Bus(BusError::Nack))
        }
    }

    fn take_write_fault(&mut self) -> Result<(), Error> {
        match self.write_fault.take() {
            Some(fault) => Err(Error::Bus(fault)),
            None => Ok(()),
        }
    }
}

impl BusAdapter for MockBus {
    fn read_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        byte_count: usize,
    ) -> Result<Bytes, Error> {
        self.check_address(device_addr)?;
        let start = reg_addr as usize;
        let end = start + byte_count;
        if end > self.registers.len() {
            return Err(Error::InvalidArgument);
        }
        let bytes = Bytes::from_slice(&self.registers[start..end])
            .map_err(|_| Error::InvalidArgument)?;
        self.record(Transaction::ReadRegister {
            address: device_addr,
            reg: reg_addr,
            len: byte_count,
        });
        Ok(bytes)
    }

    fn write_register(
        &mut self,
        device_addr: u8,
        reg_addr: u8,
        value: RegisterValue<'_>,
        byte_count: usize,
        byte_order: ByteOrder,
    ) -> Result<(), Error> {
        let bytes = encode_value(value, byte_count, byte_order)?;
        self.check_address(device_addr)?;
        self.take_write_fault()?;
        let start = reg_addr as usize;
        let end = start + bytes.len();
        if end > self.registers.len() {
            return Err(Error::InvalidArgument);
        }
        self.registers[start..end].copy_from_slice(&bytes);
        self.record(Transaction::WriteRegister {
            address: device_addr,
            reg: reg_addr,
            bytes,
        });
        Ok(())
    }

    fn read(&mut self, device_addr: u8, n_bytes: usize) -> Result<Bytes, Error> {
        self.check_address(device_addr)?;
        self.record(Transaction::Read {
            address: device_addr,
            len: n_bytes,
        });
        match self.responses.pop_front() {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(fault)) => Err(Error::Bus(fault)),
            None => self.repeat.clone().ok_or(Error::Bus(BusError::Nack)),
        }
    }

    fn write(&mut self, device_addr: u8, buf: &[u8]) -> Result<(), Error> {
        self.check_address(device_addr)?;
        self.take_write_fault()?;
        let bytes = Bytes::from_slice(buf).map_err(|_| Error::InvalidArgument)?;
        self.record(Transaction::Write {
            address: device_addr,
            bytes,
        });
        Ok(())
    }
}

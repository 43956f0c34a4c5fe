//! Scripted recording transport for unit tests

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::spi::opcodes;
use crate::transport::{Transport, TransportError};

/// One transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    Write(Vec<u8>),
    Read(usize),
    Delay(u32),
}

/// Records every call and answers reads from a script
///
/// Status reads (a read inside a frame that started with RDSR) pop the
/// next scripted status byte, falling back to `idle_status`. Other reads
/// are filled from `read_data`.
#[derive(Debug, Default)]
pub struct MockBus {
    pub events: Vec<Event>,
    pub statuses: VecDeque<u8>,
    pub idle_status: u8,
    pub read_data: Vec<u8>,
    /// Fail the write call with this zero-based index
    pub fail_write: Option<usize>,
    /// Report the bus busy after every transfer
    pub busy: bool,
    writes: usize,
    opcode: Option<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue status register values for the next status reads
    pub fn with_statuses(mut self, statuses: &[u8]) -> Self {
        self.statuses.extend(statuses.iter().copied());
        self
    }

    pub fn with_read_data(mut self, data: &[u8]) -> Self {
        self.read_data = data.to_vec();
        self
    }

    /// Bytes written in each chip-select frame, in order
    pub fn commands(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        for event in &self.events {
            match event {
                Event::Select => current = Some(Vec::new()),
                Event::Write(data) => {
                    if let Some(frame) = current.as_mut() {
                        frame.extend_from_slice(data);
                    }
                }
                Event::Deselect => {
                    if let Some(frame) = current.take() {
                        out.push(frame);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Number of write calls made
    pub fn write_calls(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Write(_)))
            .count()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Delay(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    /// Check that every select has a matching deselect
    pub fn balanced(&self) -> bool {
        let selects = self.events.iter().filter(|e| **e == Event::Select).count();
        let deselects = self
            .events
            .iter()
            .filter(|e| **e == Event::Deselect)
            .count();
        selects == deselects
    }
}

impl Transport for MockBus {
    fn select(&mut self) -> Result<(), TransportError> {
        self.events.push(Event::Select);
        self.opcode = None;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        self.events.push(Event::Deselect);
        Ok(())
    }

    fn is_busy(&mut self) -> bool {
        self.busy
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write == Some(index) {
            return Err(TransportError);
        }
        if self.opcode.is_none() {
            self.opcode = data.first().copied();
        }
        self.events.push(Event::Write(data.to_vec()));
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.events.push(Event::Read(buf.len()));
        if self.opcode == Some(opcodes::RDSR) {
            let status = self.statuses.pop_front().unwrap_or(self.idle_status);
            buf.fill(status);
        } else {
            let fill = self.read_data.iter().copied().chain(core::iter::repeat(0xFF));
            for (dst, src) in buf.iter_mut().zip(fill) {
                *dst = src;
            }
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) -> Result<(), TransportError> {
        self.events.push(Event::Delay(us));
        Ok(())
    }
}

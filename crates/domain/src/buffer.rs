//! Position/limit byte buffer used for query and answer bytes.
//!
//! Writing fills `[position, limit)`; [`WireBuffer::flip`] turns the written
//! prefix into the readable region. Storage is allocated up front and
//! allocation failure is reported instead of aborting the process.

use crate::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireBuffer {
    data: Vec<u8>,
    position: usize,
    limit: usize,
}

impl WireBuffer {
    /// Empty buffer ready for writing `capacity` bytes.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, DomainError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| DomainError::OutOfMemory(capacity))?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            position: 0,
            limit: capacity,
        })
    }

    /// Buffer whose readable region is exactly `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let limit = bytes.len();
        Self {
            data: bytes,
            position: 0,
            limit,
        }
    }

    /// Reallocates to `capacity`, discarding contents, and clears.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), DomainError> {
        *self = Self::try_with_capacity(capacity)?;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn is_full(&self) -> bool {
        self.position == self.capacity()
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    pub fn skip(&mut self, count: usize) -> Result<(), DomainError> {
        if count > self.remaining() {
            return Err(DomainError::BufferOverflow {
                needed: count,
                available: self.remaining(),
            });
        }
        self.position += count;
        Ok(())
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), DomainError> {
        if bytes.len() > self.remaining() {
            return Err(DomainError::BufferOverflow {
                needed: bytes.len(),
                available: self.remaining(),
            });
        }
        self.data[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        let value = u16::from_be_bytes([self.data[self.position], self.data[self.position + 1]]);
        self.position += 2;
        Some(value)
    }

    /// Bytes in `[position, limit)`.
    pub fn current(&self) -> &[u8] {
        &self.data[self.position..self.limit]
    }

    /// Bytes in `[0, limit)`.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.limit]
    }

    /// Readable region as an owned vector.
    pub fn into_readable(mut self) -> Vec<u8> {
        self.data.truncate(self.limit);
        if self.position > 0 {
            self.data.drain(..self.position);
        }
        self.data
    }
}

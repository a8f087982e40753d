//! edge_flags.bin - packed per-way acceptance/priority/speed flags
//!
//! Format (little-endian):
//!
//! Header (16 bytes):
//!   magic:           u32 = 0x48494B45  // "HIKE"
//!   profile_version: u16
//!   speed_bits:      u8
//!   reserved:        u8  = 0
//!   count:           u64
//!
//! Body (count records, sorted by way_id, 16 bytes each):
//!   way_id:   i64
//!   flags:    u32
//!   reserved: u32 = 0
//!
//! Footer (16 bytes):
//!   body_crc64: u64
//!   file_crc64: u64
//!
//! The stored profile version must match the loading profile's declared
//! version; a mismatch is fatal and never retried.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crc::{Crc, CRC_64_GO_ISO};
use thiserror::Error;

use crate::priority::PriorityCode;
use crate::profiles::hike::{AcceptDecision, HikeConfig, HikeProfile};

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

const MAGIC: u32 = 0x48494B45; // "HIKE"
const HEADER_SIZE: usize = 16; // 4 + 2 + 1 + 1 + 8
const RECORD_SIZE: usize = 16; // 8 + 4 + 4(pad)
const FOOTER_SIZE: usize = 16;

/// Bit positions inside a packed flags word.
mod bits {
    pub const ACCEPT: u32 = 0;
    pub const FERRY: u32 = 1;
    pub const PLATFORM: u32 = 2;
    pub const PRIORITY_SHIFT: u32 = 3; // bits 3-5, priority ordinal
    pub const PRIORITY_MASK: u32 = 0x7;
    pub const SPEED_SHIFT: u32 = 8; // bits 8.., speed_bits wide
}

#[derive(Debug, Error)]
pub enum EdgeFlagsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid magic: expected {expected:#010x}, got {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("profile version mismatch: file has {stored}, profile declares {expected}")]
    VersionMismatch { stored: u16, expected: u32 },

    #[error("file truncated or oversized: expected {expected} bytes, got {found}")]
    BadSize { expected: u64, found: u64 },

    #[error("checksum mismatch: stored {stored:#018x}, computed {computed:#018x}")]
    ChecksumMismatch { stored: u64, computed: u64 },
}

/// Integer speed codec over the configured bit width.
#[derive(Debug, Clone, Copy)]
pub struct SpeedEncoder {
    bits: u32,
    factor: f64,
}

impl SpeedEncoder {
    pub fn new(bits: u32, factor: f64) -> Self {
        // The flags word leaves 24 bits above the fixed fields.
        Self {
            bits: bits.min(24),
            factor,
        }
    }

    pub fn from_config(config: &HikeConfig) -> Self {
        Self::new(config.speed_bits, config.speed_factor)
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Widest storable increment count.
    pub fn max_storable(&self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Encode km/h into the stored increment count, clamping at the top of
    /// the range.
    pub fn encode(&self, speed_kmh: f64) -> u32 {
        let raw = (speed_kmh.max(0.0) / self.factor).round() as u32;
        raw.min(self.max_storable())
    }

    /// Decode a stored increment count back to km/h (modulo the encoder
    /// precision).
    pub fn decode(&self, stored: u32) -> f64 {
        f64::from(stored) * self.factor
    }
}

/// Packed flags word for one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFlags(pub u32);

impl EdgeFlags {
    pub fn pack(
        decision: AcceptDecision,
        priority: PriorityCode,
        speed_kmh: f64,
        speed: &SpeedEncoder,
    ) -> EdgeFlags {
        let mut word = 0u32;
        match decision {
            AcceptDecision::Reject => {}
            AcceptDecision::Accept => word |= 1 << bits::ACCEPT,
            AcceptDecision::AcceptFerry => word |= (1 << bits::ACCEPT) | (1 << bits::FERRY),
            AcceptDecision::AcceptPlatform => word |= (1 << bits::ACCEPT) | (1 << bits::PLATFORM),
        }
        word |= u32::from(priority.ordinal()) << bits::PRIORITY_SHIFT;
        word |= speed.encode(speed_kmh) << bits::SPEED_SHIFT;
        EdgeFlags(word)
    }

    pub fn decision(self) -> AcceptDecision {
        if self.0 & (1 << bits::ACCEPT) == 0 {
            AcceptDecision::Reject
        } else if self.0 & (1 << bits::FERRY) != 0 {
            AcceptDecision::AcceptFerry
        } else if self.0 & (1 << bits::PLATFORM) != 0 {
            AcceptDecision::AcceptPlatform
        } else {
            AcceptDecision::Accept
        }
    }

    /// `None` only for a corrupt ordinal; all values this crate packs decode.
    pub fn priority(self) -> Option<PriorityCode> {
        PriorityCode::from_ordinal(((self.0 >> bits::PRIORITY_SHIFT) & bits::PRIORITY_MASK) as u8)
    }

    pub fn speed_kmh(self, speed: &SpeedEncoder) -> f64 {
        speed.decode((self.0 >> bits::SPEED_SHIFT) & speed.max_storable())
    }
}

/// One way's packed flags, keyed by OSM way id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayFlags {
    pub way_id: i64,
    pub flags: EdgeFlags,
}

/// Write an edge_flags.bin file.
pub fn write<P: AsRef<Path>>(
    path: P,
    profile: &HikeProfile,
    records: &[WayFlags],
) -> Result<(), EdgeFlagsError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.way_id);

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&MAGIC.to_le_bytes());
    header.extend_from_slice(&(profile.version() as u16).to_le_bytes());
    header.push(profile.config().speed_bits as u8);
    header.push(0); // reserved
    header.extend_from_slice(&(sorted.len() as u64).to_le_bytes());
    debug_assert_eq!(header.len(), HEADER_SIZE);

    writer.write_all(&header)?;

    let mut body_digest = CRC64.digest();
    let mut file_digest = CRC64.digest();
    file_digest.update(&header);

    for record in &sorted {
        let encoded = encode_record(record);
        body_digest.update(&encoded);
        file_digest.update(&encoded);
        writer.write_all(&encoded)?;
    }

    writer.write_all(&body_digest.finalize().to_le_bytes())?;
    writer.write_all(&file_digest.finalize().to_le_bytes())?;
    writer.flush()?;
    Ok(())
}

fn encode_record(record: &WayFlags) -> [u8; RECORD_SIZE] {
    let mut encoded = [0u8; RECORD_SIZE];
    encoded[0..8].copy_from_slice(&record.way_id.to_le_bytes());
    encoded[8..12].copy_from_slice(&record.flags.0.to_le_bytes());
    // bytes 12..16 reserved
    encoded
}

/// Read an edge_flags.bin file, verifying magic, profile version, size and
/// checksums.
pub fn read<P: AsRef<Path>>(
    path: P,
    profile: &HikeProfile,
) -> Result<Vec<WayFlags>, EdgeFlagsError> {
    let data = std::fs::read(path.as_ref())?;
    if data.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(EdgeFlagsError::BadSize {
            expected: (HEADER_SIZE + FOOTER_SIZE) as u64,
            found: data.len() as u64,
        });
    }

    let magic = le_u32(&data[0..4]);
    if magic != MAGIC {
        return Err(EdgeFlagsError::BadMagic {
            expected: MAGIC,
            found: magic,
        });
    }

    let stored_version = u16::from_le_bytes([data[4], data[5]]);
    if u32::from(stored_version) != profile.version() {
        return Err(EdgeFlagsError::VersionMismatch {
            stored: stored_version,
            expected: profile.version(),
        });
    }

    let count = le_u64(&data[8..16]);
    let expected_size = HEADER_SIZE as u64 + count * RECORD_SIZE as u64 + FOOTER_SIZE as u64;
    if data.len() as u64 != expected_size {
        return Err(EdgeFlagsError::BadSize {
            expected: expected_size,
            found: data.len() as u64,
        });
    }

    let body_end = HEADER_SIZE + (count as usize) * RECORD_SIZE;
    let body = &data[HEADER_SIZE..body_end];

    let stored_body_crc = le_u64(&data[body_end..body_end + 8]);
    let computed_body_crc = CRC64.checksum(body);
    if stored_body_crc != computed_body_crc {
        return Err(EdgeFlagsError::ChecksumMismatch {
            stored: stored_body_crc,
            computed: computed_body_crc,
        });
    }

    let stored_file_crc = le_u64(&data[body_end + 8..body_end + 16]);
    let computed_file_crc = CRC64.checksum(&data[..body_end]);
    if stored_file_crc != computed_file_crc {
        return Err(EdgeFlagsError::ChecksumMismatch {
            stored: stored_file_crc,
            computed: computed_file_crc,
        });
    }

    let records = body
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| WayFlags {
            way_id: le_i64(&chunk[0..8]),
            flags: EdgeFlags(le_u32(&chunk[8..12])),
        })
        .collect();

    Ok(records)
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn le_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    i64::from_le_bytes(buf)
}

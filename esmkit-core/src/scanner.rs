//! Record stream walking for whole plugin files

use crate::constants::{LengthWidth, GROUP_HEADER_SIZE, GRUP};
use crate::cursor::Reader;
use crate::record::{decode_record, Record, RecordHeader};
use crate::types::DecodeContext;
use alloc::vec::Vec;
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A record found at a specific offset in the stream
#[derive(Debug, Clone)]
pub struct LocatedRecord {
    /// Byte offset of the record header
    pub offset: usize,

    /// The decoded header
    pub header: RecordHeader,

    /// The decoded body
    pub record: Record,

    /// Header plus body size in bytes
    pub size: usize,
}

/// Scan statistics
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Total bytes scanned
    pub bytes_scanned: usize,

    /// Number of records decoded
    pub records_found: usize,

    /// Number of decoded records that are quests
    pub quests_decoded: usize,

    /// Number of group headers stepped into
    pub groups_entered: usize,

    /// Number of records that failed to decode
    pub decode_failures: usize,

    /// Sum of all decoded record sizes
    pub bytes_recovered: usize,
}

impl ScanStats {
    /// Calculate recovery rate as a percentage
    pub fn recovery_rate(&self) -> f64 {
        if self.bytes_scanned == 0 {
            0.0
        } else {
            (self.bytes_recovered as f64 / self.bytes_scanned as f64) * 100.0
        }
    }
}

/// Walk a plugin byte stream record by record
///
/// Group headers are transparent: the walk steps over the 24-byte header and
/// continues with the records inside. A record whose body fails to decode is
/// counted and skipped using its declared size. The walk stops at the first
/// header that cannot be read.
pub fn scan_records(
    data: &[u8],
    width: LengthWidth,
    ctx: &DecodeContext<'_>,
) -> (Vec<LocatedRecord>, ScanStats) {
    let buf = Bytes::copy_from_slice(data);
    let mut stats = ScanStats {
        bytes_scanned: buf.len(),
        ..Default::default()
    };
    let mut results = Vec::new();
    let mut pos = 0;

    #[cfg(feature = "logging")]
    debug!("Starting record scan of {} bytes", buf.len());

    while pos < buf.len() {
        let mut reader = Reader::new(buf.slice(pos..), width);
        let header = match RecordHeader::read(&mut reader) {
            Ok(header) => header,
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!("Unreadable header at offset {}: {:?}", pos, _e);
                break;
            }
        };

        if header.tag == GRUP {
            stats.groups_entered += 1;
            pos += GROUP_HEADER_SIZE;
            continue;
        }

        let mut reader = Reader::new(buf.slice(pos..), width);
        match decode_record(&mut reader, ctx) {
            Ok((header, record)) => {
                let size = reader.consumed();

                #[cfg(feature = "logging")]
                debug!(
                    "Decoded {} record {:08X} at offset {} ({} bytes)",
                    header.tag, header.form_id, pos, size
                );

                if matches!(record, Record::Quest(_)) {
                    stats.quests_decoded += 1;
                }
                stats.bytes_recovered += size;
                results.push(LocatedRecord {
                    offset: pos,
                    header,
                    record,
                    size,
                });
                pos += size;
            }
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!(
                    "Failed to decode {} record at offset {}: {:?}",
                    header.tag, pos, _e
                );

                stats.decode_failures += 1;
                pos += header.total_size();
            }
        }
    }

    stats.records_found = results.len();

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: {} records ({} quests), {} failures",
        stats.records_found, stats.quests_decoded, stats.decode_failures
    );

    (results, stats)
}

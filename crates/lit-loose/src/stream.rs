use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use lit_object::header;
use lit_object::ObjectType;

use crate::{LooseError, LooseObjectStore};

/// Streaming reader for a loose object's content, decompressing on demand.
pub struct LooseObjectStream {
    obj_type: ObjectType,
    size: usize,
    decoder: ZlibDecoder<fs::File>,
    bytes_read: usize,
}

impl LooseObjectStream {
    pub fn object_type(&self) -> ObjectType {
        self.obj_type
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bytes_remaining(&self) -> usize {
        self.size.saturating_sub(self.bytes_read)
    }
}

impl Read for LooseObjectStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.bytes_remaining();
        if remaining == 0 {
            return Ok(0);
        }
        let max_read = remaining.min(buf.len());
        let n = self.decoder.read(&mut buf[..max_read])?;
        self.bytes_read += n;
        Ok(n)
    }
}

impl LooseObjectStore {
    /// Open a streaming reader for a loose object. `Ok(None)` if it does not exist.
    pub fn stream(&self, oid: &lit_hash::ObjectId) -> Result<Option<LooseObjectStream>, LooseError> {
        let path = self.object_path(oid);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        // First pass: decompress just the header to learn type, size, and its length.
        let mut decoder = ZlibDecoder::new(file);
        let mut hdr_buf = [0u8; 64];
        let mut filled = 0;

        loop {
            if filled >= hdr_buf.len() {
                return Err(LooseError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "header exceeds 64 bytes".into(),
                });
            }
            let n = decoder
                .read(&mut hdr_buf[filled..])
                .map_err(|e| LooseError::Decompress {
                    oid: oid.to_hex(),
                    source: e,
                })?;
            if n == 0 {
                return Err(LooseError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "unexpected EOF before header null terminator".into(),
                });
            }
            filled += n;
            if hdr_buf[..filled].contains(&0) {
                break;
            }
        }

        let (obj_type, content_size, header_len) = header::parse_header(&hdr_buf[..filled])?;

        // Re-open and skip past the header so later reads yield only content.
        let file2 = fs::File::open(&path)?;
        let mut decoder2 = ZlibDecoder::new(file2);
        let mut skip_buf = vec![0u8; header_len];
        decoder2
            .read_exact(&mut skip_buf)
            .map_err(|e| LooseError::Decompress {
                oid: oid.to_hex(),
                source: e,
            })?;

        Ok(Some(LooseObjectStream {
            obj_type,
            size: content_size,
            decoder: decoder2,
            bytes_read: 0,
        }))
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::source::{PacketEvent, PacketSource, SourceError};

use super::reader::parse_line;

/// `PacketSource` reading one hex-encoded packet per line.
pub struct HexDumpSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl HexDumpSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> HexDumpSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> PacketSource for HexDumpSource<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        loop {
            self.buf.clear();
            let read = self.reader.read_line(&mut self.buf)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let parsed = parse_line(&self.buf).map_err(|e| SourceError::Hex {
                line: self.line_no,
                message: e.to_string(),
            })?;
            if let Some(line) = parsed {
                return Ok(Some(PacketEvent {
                    ts: line.ts,
                    line: self.line_no,
                    data: line.data,
                }));
            }
        }
    }
}

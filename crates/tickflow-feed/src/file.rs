//! Fixed-width binary tick file reader and writer.
//!
//! Record layout, little-endian:
//! `[symbol: 8 bytes, space padded][price: f64][quantity: f64]`
//! `[timestamp_ms: i64][flags: u8]` — 33 bytes per record. Bit 0 of flags
//! marks a buyer-initiated trade.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nom::bytes::complete::take;
use nom::number::complete::{le_f64, le_i64, le_u8};
use nom::IResult;

use tickflow_core::constants::TICK_SYMBOL_WIDTH;
use tickflow_core::traits::{MarketSource, Tick};

use crate::error::{FeedError, FeedResult};

/// Size of one encoded tick record in bytes
pub const TICK_RECORD_SIZE: usize = TICK_SYMBOL_WIDTH + 8 + 8 + 8 + 1;

fn parse_record(input: &[u8]) -> IResult<&[u8], (&[u8], f64, f64, i64, u8)> {
    let (input, symbol) = take(TICK_SYMBOL_WIDTH)(input)?;
    let (input, price) = le_f64(input)?;
    let (input, quantity) = le_f64(input)?;
    let (input, timestamp_ms) = le_i64(input)?;
    let (input, flags) = le_u8(input)?;
    Ok((input, (symbol, price, quantity, timestamp_ms, flags)))
}

/// Decode one record from a full-size buffer.
fn decode_record(buf: &[u8], offset: u64) -> FeedResult<Tick> {
    let (_, (symbol_bytes, price, quantity, timestamp_ms, flags)) = parse_record(buf)?;

    let symbol = std::str::from_utf8(symbol_bytes)
        .map_err(|_| FeedError::InvalidSymbol(offset))?
        .trim_end()
        .to_string();
    if symbol.is_empty() {
        return Err(FeedError::InvalidField {
            field: "symbol",
            value: String::new(),
        });
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(FeedError::InvalidField {
            field: "price",
            value: price.to_string(),
        });
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(FeedError::InvalidField {
            field: "quantity",
            value: quantity.to_string(),
        });
    }

    Ok(Tick {
        symbol,
        price,
        quantity,
        timestamp_ms,
        buyer_initiated: flags & 0x01 != 0,
    })
}

/// Buffered reader over a binary tick file.
pub struct TickFileReader {
    reader: BufReader<File>,
    offset: u64,
}

impl TickFileReader {
    /// Buffer size for file reading (1MB)
    const BUFFER_SIZE: usize = 1024 * 1024;

    /// Open a tick file for reading
    ///
    /// # Errors
    ///
    /// I/O failure opening the file.
    pub fn open<P: AsRef<Path>>(path: P) -> FeedResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::with_capacity(Self::BUFFER_SIZE, file),
            offset: 0,
        })
    }

    /// Read the next tick, or `None` at a clean end of file.
    ///
    /// # Errors
    ///
    /// [`FeedError::Truncated`] if the file ends mid-record, decode errors
    /// for malformed fields, I/O errors from the underlying reader.
    pub fn read_tick(&mut self) -> FeedResult<Option<Tick>> {
        let mut buf = [0u8; TICK_RECORD_SIZE];
        let mut filled = 0;

        while filled < TICK_RECORD_SIZE {
            let n = self.reader.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(FeedError::Truncated {
                    got: filled,
                    expected: TICK_RECORD_SIZE,
                });
            }
            filled += n;
        }

        let tick = decode_record(&buf, self.offset)?;
        self.offset += TICK_RECORD_SIZE as u64;
        Ok(Some(tick))
    }
}

impl MarketSource for TickFileReader {
    /// Ticks until end of file; a malformed record ends the stream with a
    /// warning rather than panicking the engine loop.
    fn next(&mut self) -> Option<Tick> {
        match self.read_tick() {
            Ok(tick) => tick,
            Err(err) => {
                tracing::warn!(error = %err, "tick file read failed, ending stream");
                None
            }
        }
    }
}

/// Buffered writer producing the binary tick format.
pub struct TickFileWriter {
    writer: BufWriter<File>,
}

impl TickFileWriter {
    /// Create (truncate) a tick file for writing
    ///
    /// # Errors
    ///
    /// I/O failure creating the file.
    pub fn create<P: AsRef<Path>>(path: P) -> FeedResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one tick record
    ///
    /// # Errors
    ///
    /// [`FeedError::SymbolTooLong`] if the symbol exceeds the field width,
    /// I/O errors from the underlying writer.
    pub fn write_tick(&mut self, tick: &Tick) -> FeedResult<()> {
        if tick.symbol.len() > TICK_SYMBOL_WIDTH {
            return Err(FeedError::SymbolTooLong(tick.symbol.clone()));
        }

        let mut symbol = [b' '; TICK_SYMBOL_WIDTH];
        symbol[..tick.symbol.len()].copy_from_slice(tick.symbol.as_bytes());

        self.writer.write_all(&symbol)?;
        self.writer.write_all(&tick.price.to_le_bytes())?;
        self.writer.write_all(&tick.quantity.to_le_bytes())?;
        self.writer.write_all(&tick.timestamp_ms.to_le_bytes())?;
        let flags = u8::from(tick.buyer_initiated);
        self.writer.write_all(&[flags])?;
        Ok(())
    }

    /// Flush buffered records to disk
    ///
    /// # Errors
    ///
    /// I/O errors from the underlying writer.
    pub fn flush(&mut self) -> FeedResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(symbol: &str, price: f64, ts_ms: i64, buyer: bool) -> Tick {
        Tick {
            symbol: symbol.to_string(),
            price,
            quantity: 2.5,
            timestamp_ms: ts_ms,
            buyer_initiated: buyer,
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.bin");

        let mut writer = TickFileWriter::create(&path).unwrap();
        writer.write_tick(&tick("BTCUSD", 100.5, 1_000, true)).unwrap();
        writer.write_tick(&tick("ETHUSD", 10.25, 2_000, false)).unwrap();
        writer.flush().unwrap();

        let mut reader = TickFileReader::open(&path).unwrap();
        let first = reader.read_tick().unwrap().unwrap();
        assert_eq!(first.symbol, "BTCUSD");
        assert_eq!(first.price, 100.5);
        assert!(first.buyer_initiated);

        let second = reader.read_tick().unwrap().unwrap();
        assert_eq!(second.symbol, "ETHUSD");
        assert_eq!(second.timestamp_ms, 2_000);
        assert!(!second.buyer_initiated);

        assert!(reader.read_tick().unwrap().is_none());
    }

    #[test]
    fn test_truncated_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.bin");

        let mut writer = TickFileWriter::create(&path).unwrap();
        writer.write_tick(&tick("BTCUSD", 100.5, 1_000, true)).unwrap();
        writer.flush().unwrap();

        // Chop the last byte off.
        let data = std::fs::read(&path).unwrap();
        std::fs::write(&path, &data[..data.len() - 1]).unwrap();

        let mut reader = TickFileReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_tick(),
            Err(FeedError::Truncated { .. })
        ));
    }

    #[test]
    fn test_symbol_too_long_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.bin");

        let mut writer = TickFileWriter::create(&path).unwrap();
        let result = writer.write_tick(&tick("VERYLONGSYMBOL", 1.0, 0, false));
        assert!(matches!(result, Err(FeedError::SymbolTooLong(_))));
    }

    #[test]
    fn test_invalid_price_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.bin");

        let mut writer = TickFileWriter::create(&path).unwrap();
        writer.write_tick(&tick("BTCUSD", -5.0, 0, false)).unwrap();
        writer.flush().unwrap();

        let mut reader = TickFileReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_tick(),
            Err(FeedError::InvalidField { field: "price", .. })
        ));
    }

    #[test]
    fn test_market_source_impl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.bin");

        let mut writer = TickFileWriter::create(&path).unwrap();
        for i in 0..5 {
            writer.write_tick(&tick("BTCUSD", 100.0 + i as f64, i, true)).unwrap();
        }
        writer.flush().unwrap();

        let mut source = TickFileReader::open(&path).unwrap();
        let mut count = 0;
        while let Some(t) = MarketSource::next(&mut source) {
            assert_eq!(t.symbol, "BTCUSD");
            count += 1;
        }
        assert_eq!(count, 5);
    }
}

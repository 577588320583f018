// src/lib.rs
// TRC Reader Library - Public API

//! # TRC Reader
//!
//! A Rust library for reading LeCroy `.trc` waveform files (template `LECROY_2_3`),
//! including sequence (segmented) acquisitions.
//!
//! ## Features
//!
//! - Locate the WAVEDESC descriptor and honour its self-declared byte order
//! - Decode every descriptor field into a typed [`WaveformHeader`]
//! - Rebuild time and amplitude arrays for single sweeps and sequences
//! - Export data to CSV format
//! - Proper error handling
//!
//! ## Example
//!
//! ```no_run
//! use trc_reader::decode_file;
//!
//! let trace = decode_file("C1Trace00000.trc").expect("Failed to load file");
//!
//! println!("Source: {}", trace.header.wave_source);
//! println!("Timebase: {}", trace.header.timebase);
//! println!("Segments: {}", trace.segment_count());
//!
//! // Access a specific segment
//! if let Some((time, volts)) = trace.segment(0) {
//!     println!("First sample: {} {} at {} s", volts[0], trace.header.vertunit, time[0]);
//! }
//!
//! // Export to CSV
//! trace.write_csv("output.csv").expect("Failed to write CSV");
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::instrument;

pub mod engineering;
mod enums;
mod error;
mod header;
mod locator;
mod reader;
mod waveform;

pub use enums::{
    BandwidthLimit, CommOrder, CommType, DerivedLabel, ProcessingDone, RecordType, VertCoupling,
};
pub use error::{Result, TrcError};
pub use header::{TriggerTime, WaveformHeader, DESCRIPTOR_LENGTH, TEMPLATE_NAME};
pub use locator::{locate_header, resolve_byte_order, HeaderLocation};
pub use waveform::{DecodedWaveform, WaveArray};

use reader::ByteReader;

/// Decode a complete `.trc` image from a seekable byte source.
///
/// The source is read from its beginning; the first failing check aborts the
/// whole decode.
#[instrument(level = "debug", skip(source), err)]
pub fn decode<R: Read + Seek>(source: &mut R) -> Result<DecodedWaveform> {
    let location = locate_header(source)?;
    let order = resolve_byte_order(source, location.start)?;

    let mut reader = ByteReader::new(source, order)?;
    let header = header::decode_header(&mut reader, location)?;
    let user_text = header::read_user_text(&mut reader, &header)?;
    let (time, primary, secondary) = waveform::reconstruct(&mut reader, &header)?;

    Ok(DecodedWaveform {
        header,
        user_text,
        time,
        primary,
        secondary,
    })
}

/// Open `path` and [`decode`] it.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedWaveform> {
    let mut source = BufReader::new(File::open(path)?);
    decode(&mut source)
}

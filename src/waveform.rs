// src/waveform.rs
// Sample payload reconstruction and export

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::{debug, trace};

use crate::error::{Result, TrcError};
use crate::header::WaveformHeader;
use crate::reader::ByteReader;

/// Time or amplitude values: flat for a single sweep, one row per segment for
/// a sequence acquisition.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveArray {
    Sweep(Array1<f64>),
    Segments(Array2<f64>),
}

impl WaveArray {
    pub fn len(&self) -> usize {
        match self {
            WaveArray::Sweep(values) => values.len(),
            WaveArray::Segments(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            WaveArray::Sweep(values) => values.shape(),
            WaveArray::Segments(values) => values.shape(),
        }
    }

    /// Number of rows; a single sweep counts as one.
    pub fn segment_count(&self) -> usize {
        match self {
            WaveArray::Sweep(_) => 1,
            WaveArray::Segments(values) => values.nrows(),
        }
    }

    /// Row `index`, or the whole sweep for index 0 of a single sweep.
    pub fn segment(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        match self {
            WaveArray::Sweep(values) => (index == 0).then(|| values.view()),
            WaveArray::Segments(values) => {
                (index < values.nrows()).then(|| values.index_axis(Axis(0), index))
            }
        }
    }

    /// All values in row-major order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &f64> + '_> {
        match self {
            WaveArray::Sweep(values) => Box::new(values.iter()),
            WaveArray::Segments(values) => Box::new(values.iter()),
        }
    }
}

/// Everything a `.trc` file holds.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWaveform {
    pub header: WaveformHeader,
    pub user_text: Vec<u8>,
    pub time: WaveArray,
    pub primary: WaveArray,
    /// Second channel of a single sweep; empty when WAVE_ARRAY_2 is not positive.
    pub secondary: Array1<f64>,
}

impl DecodedWaveform {
    pub fn is_sequence(&self) -> bool {
        matches!(self.primary, WaveArray::Segments(_))
    }

    pub fn segment_count(&self) -> usize {
        self.primary.segment_count()
    }

    pub fn samples_per_segment(&self) -> usize {
        match &self.primary {
            WaveArray::Sweep(values) => values.len(),
            WaveArray::Segments(values) => values.ncols(),
        }
    }

    pub fn has_secondary(&self) -> bool {
        !self.secondary.is_empty()
    }

    /// Time and primary values of one segment.
    pub fn segment(&self, index: usize) -> Option<(ArrayView1<'_, f64>, ArrayView1<'_, f64>)> {
        Some((self.time.segment(index)?, self.primary.segment(index)?))
    }

    /// Write all samples to CSV. Single sweeps get `Time,Primary[,Secondary]`
    /// columns, sequences one row per sample tagged with its segment.
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);

        if self.is_sequence() {
            writeln!(writer, "Segment,Sample,Time,Primary")?;
            for segment in 0..self.segment_count() {
                if let Some((time, primary)) = self.segment(segment) {
                    for (sample, (t, v)) in time.iter().zip(primary.iter()).enumerate() {
                        writeln!(writer, "{},{},{},{}", segment, sample, t, v)?;
                    }
                }
            }
        } else {
            if self.has_secondary() {
                writeln!(writer, "Time,Primary,Secondary")?;
            } else {
                writeln!(writer, "Time,Primary")?;
            }
            for (idx, (t, v)) in self.time.iter().zip(self.primary.iter()).enumerate() {
                match self.secondary.get(idx) {
                    Some(s) => writeln!(writer, "{},{},{}", t, v, s)?,
                    None => writeln!(writer, "{},{}", t, v)?,
                }
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Write segments as separate columns
    pub fn write_csv_by_segment<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "Sample")?;
        for i in 0..self.segment_count() {
            write!(writer, ",Segment{}", i)?;
        }
        writeln!(writer)?;

        let rows: Vec<_> = (0..self.segment_count())
            .filter_map(|i| self.primary.segment(i))
            .collect();
        for sample in 0..self.samples_per_segment() {
            write!(writer, "{}", sample)?;
            for row in &rows {
                write!(writer, ",{}", row[sample])?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Read the arrays that follow USER_TEXT, as laid out by `header`.
pub(crate) fn reconstruct<R: Read + Seek>(
    reader: &mut ByteReader<'_, R>,
    header: &WaveformHeader,
) -> Result<(WaveArray, WaveArray, Array1<f64>)> {
    if header.wave_array_count < 0 {
        return Err(TrcError::NegativeCount {
            field: "WAVE_ARRAY_COUNT",
            value: header.wave_array_count,
        });
    }

    if header.is_sequence() {
        read_sequence(reader, header)
    } else {
        read_single_sweep(reader, header)
    }
}

fn scale(raw: Vec<f64>, header: &WaveformHeader) -> Vec<f64> {
    let gain = f64::from(header.vertical_gain);
    let offset = f64::from(header.vertical_offset);
    raw.into_iter().map(|value| value * gain - offset).collect()
}

fn read_sequence<R: Read + Seek>(
    reader: &mut ByteReader<'_, R>,
    header: &WaveformHeader,
) -> Result<(WaveArray, WaveArray, Array1<f64>)> {
    let points = header.wave_array_count;
    let segments = header.subarray_count;
    if points % segments != 0 {
        return Err(TrcError::UnevenSegmentSplit { points, segments });
    }
    let segments = segments as usize;
    let per_segment = points as usize / segments;
    debug!(segments, per_segment, "reading sequence acquisition");

    // TRIGTIME: one (time, offset) pair of f64 per segment
    reader.ensure_available(segments as u64 * 16)?;
    let mut starts = Vec::with_capacity(segments);
    for _ in 0..segments {
        let trigger_time = reader.read_f64()?;
        let trigger_offset = reader.read_f64()?;
        starts.push(trigger_time + trigger_offset);
    }

    // Samples first: the payload length bounds the time array as well
    let width = header.sample_width();
    trace!(bytes = points as usize * width, "reading sample payload");
    let raw = reader.read_samples(points as usize, width)?;
    let primary = Array2::from_shape_vec((segments, per_segment), scale(raw, header))
        .map_err(|_| TrcError::UnevenSegmentSplit { points, segments: header.subarray_count })?;

    let interval = f64::from(header.horiz_interval);
    let time = Array2::from_shape_fn((segments, per_segment), |(i, j)| {
        j as f64 * interval + starts[i]
    });

    Ok((
        WaveArray::Segments(time),
        WaveArray::Segments(primary),
        Array1::zeros(0),
    ))
}

fn read_single_sweep<R: Read + Seek>(
    reader: &mut ByteReader<'_, R>,
    header: &WaveformHeader,
) -> Result<(WaveArray, WaveArray, Array1<f64>)> {
    let count = header.wave_array_count as usize;
    let width = header.sample_width();
    debug!(count, width, "reading single sweep");

    let primary = Array1::from_vec(scale(reader.read_samples(count, width)?, header));
    let secondary = if header.wave_array_2 > 0 {
        trace!("reading second data array");
        Array1::from_vec(scale(reader.read_samples(count, width)?, header))
    } else {
        Array1::zeros(0)
    };

    let interval = f64::from(header.horiz_interval);
    let time = Array1::from_shape_fn(count, |j| j as f64 * interval + header.horiz_offset);

    Ok((WaveArray::Sweep(time), WaveArray::Sweep(primary), secondary))
}

// src/header.rs
// WAVEDESC decoding for template LECROY_2_3

use std::fmt;
use std::io::{Read, Seek};

use tracing::debug;

use crate::enums::{
    self, BandwidthLimit, CommOrder, CommType, DerivedLabel, ProcessingDone, RecordType,
    VertCoupling,
};
use crate::error::{Result, TrcError};
use crate::locator::{HeaderLocation, COMM_ORDER_OFFSET};
use crate::reader::ByteReader;

pub const TEMPLATE_NAME: &str = "LECROY_2_3";

/// Bytes WAVEDESC occupies under LECROY_2_3.
pub const DESCRIPTOR_LENGTH: u64 = 346;

const NAME_WIDTH: usize = 16;
const UNIT_WIDTH: usize = 48;

/// Time of the (first) trigger as stored in the descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriggerTime {
    pub seconds: f64,
    pub minutes: i8,
    pub hours: i8,
    pub day: i8,
    pub month: i8,
    pub year: i16,
    pub unused: i16,
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:09.6}",
            self.year, self.month, self.day, self.hours, self.minutes, self.seconds
        )
    }
}

/// The decoded WAVEDESC block.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformHeader {
    pub descriptor_name: String,
    pub template_name: String,
    pub comm_type: CommType,
    pub comm_order: CommOrder,

    // Block lengths in bytes
    pub wave_descriptor: i32,
    pub user_text: i32,
    pub res_desc1: i32,
    pub trigtime_array: i32,
    pub ris_time_array: i32,
    pub res_array1: i32,
    pub wave_array_1: i32,
    pub wave_array_2: i32,
    pub res_array2: i32,
    pub res_array3: i32,

    pub instrument_name: String,
    pub instrument_number: i32,
    pub trace_label: String,
    pub reserved1: i16,
    pub reserved2: i16,

    pub wave_array_count: i32,
    pub pnts_per_screen: i32,
    pub first_valid_pnt: i32,
    pub last_valid_pnt: i32,
    pub first_point: i32,
    pub sparsing_factor: i32,
    pub segment_index: i32,
    pub subarray_count: i32,
    pub sweeps_per_acq: i32,
    pub points_per_pair: i16,
    pub pair_offset: i16,

    pub vertical_gain: f32,
    pub vertical_offset: f32,
    pub max_value: f32,
    pub min_value: f32,
    pub nominal_bits: i16,
    pub nom_subarray_count: i16,

    pub horiz_interval: f32,
    pub horiz_offset: f64,
    pub pixel_offset: f64,
    pub vertunit: String,
    pub horunit: String,
    pub horiz_uncertainty: f32,
    pub trigger_time: TriggerTime,
    pub acq_duration: f32,

    pub record_type: RecordType,
    pub processing_done: ProcessingDone,
    pub reserved5: i16,
    pub ris_sweeps: i16,
    pub timebase: DerivedLabel,
    pub vert_coupling: VertCoupling,
    pub probe_att: f32,
    pub fixed_vert_gain: DerivedLabel,
    pub bandwidth_limit: BandwidthLimit,
    pub vertical_vernier: f32,
    pub acq_vert_offset: f32,
    pub wave_source: DerivedLabel,

    pub file_size: u64,
}

impl WaveformHeader {
    /// Bytes per stored sample, from COMM_TYPE.
    pub fn sample_width(&self) -> usize {
        self.comm_type.sample_width()
    }

    /// True for sequence (segmented) acquisitions.
    pub fn is_sequence(&self) -> bool {
        self.subarray_count > 1
    }
}

/// Decode WAVEDESC starting at `location.start`, leaving the reader on the
/// first byte after it. The declared length must match what was consumed.
pub(crate) fn decode_header<R: Read + Seek>(
    reader: &mut ByteReader<'_, R>,
    location: HeaderLocation,
) -> Result<WaveformHeader> {
    let start = location.start;
    reader.seek_to(start)?;

    let descriptor_name = reader.read_string(NAME_WIDTH, "DESCRIPTOR_NAME")?;
    let template_name = reader.read_string(NAME_WIDTH, "TEMPLATE_NAME")?;
    if template_name != TEMPLATE_NAME {
        return Err(TrcError::UnsupportedTemplateVersion(template_name));
    }

    let comm_type = CommType::from_code(reader.read_i16()?)?;
    // COMM_ORDER was resolved up front
    let comm_order = reader.order();
    reader.seek_to(start + COMM_ORDER_OFFSET + 2)?;

    let wave_descriptor = reader.read_i32()?;
    let user_text = reader.read_i32()?;
    let res_desc1 = reader.read_i32()?;
    let trigtime_array = reader.read_i32()?;
    let ris_time_array = reader.read_i32()?;
    let res_array1 = reader.read_i32()?;
    let wave_array_1 = reader.read_i32()?;
    let wave_array_2 = reader.read_i32()?;
    let res_array2 = reader.read_i32()?;
    let res_array3 = reader.read_i32()?;

    let instrument_name = reader.read_string(NAME_WIDTH, "INSTRUMENT_NAME")?;
    let instrument_number = reader.read_i32()?;
    let trace_label = reader.read_string(NAME_WIDTH, "TRACE_LABEL")?;
    let reserved1 = reader.read_i16()?;
    let reserved2 = reader.read_i16()?;

    let wave_array_count = reader.read_i32()?;
    let pnts_per_screen = reader.read_i32()?;
    let first_valid_pnt = reader.read_i32()?;
    let last_valid_pnt = reader.read_i32()?;
    let first_point = reader.read_i32()?;
    let sparsing_factor = reader.read_i32()?;
    let segment_index = reader.read_i32()?;
    let subarray_count = reader.read_i32()?;
    let sweeps_per_acq = reader.read_i32()?;
    let points_per_pair = reader.read_i16()?;
    let pair_offset = reader.read_i16()?;

    let vertical_gain = reader.read_f32()?;
    let vertical_offset = reader.read_f32()?;
    let max_value = reader.read_f32()?;
    let min_value = reader.read_f32()?;
    let nominal_bits = reader.read_i16()?;
    let nom_subarray_count = reader.read_i16()?;

    let horiz_interval = reader.read_f32()?;
    let horiz_offset = reader.read_f64()?;
    let pixel_offset = reader.read_f64()?;
    let vertunit = reader.read_string(UNIT_WIDTH, "VERTUNIT")?;
    let horunit = reader.read_string(UNIT_WIDTH, "HORUNIT")?;
    let horiz_uncertainty = reader.read_f32()?;

    let trigger_time = TriggerTime {
        seconds: reader.read_f64()?,
        minutes: reader.read_i8()?,
        hours: reader.read_i8()?,
        day: reader.read_i8()?,
        month: reader.read_i8()?,
        year: reader.read_i16()?,
        unused: reader.read_i16()?,
    };
    let acq_duration = reader.read_f32()?;

    let record_type = RecordType::from_code(reader.read_i16()?)?;
    let processing_done = ProcessingDone::from_code(reader.read_i16()?)?;
    let reserved5 = reader.read_i16()?;
    let ris_sweeps = reader.read_i16()?;
    let timebase = enums::timebase(reader.read_i16()?, &horunit);
    let vert_coupling = VertCoupling::from_code(reader.read_i16()?)?;
    let probe_att = reader.read_f32()?;
    let fixed_vert_gain = enums::fixed_vert_gain(reader.read_i16()?, &vertunit);
    let bandwidth_limit = BandwidthLimit::from_code(reader.read_i16()?)?;
    let vertical_vernier = reader.read_f32()?;
    let acq_vert_offset = reader.read_f32()?;
    let wave_source = enums::wave_source(reader.read_i16()?);

    let consumed = reader.position() - start;
    if i64::from(wave_descriptor) != consumed as i64 {
        return Err(TrcError::HeaderLengthMismatch {
            declared: wave_descriptor,
            consumed,
        });
    }

    debug!(
        instrument = %instrument_name,
        comm_type = comm_type.label(),
        points = wave_array_count,
        segments = subarray_count,
        "decoded WAVEDESC"
    );

    Ok(WaveformHeader {
        descriptor_name,
        template_name,
        comm_type,
        comm_order,
        wave_descriptor,
        user_text,
        res_desc1,
        trigtime_array,
        ris_time_array,
        res_array1,
        wave_array_1,
        wave_array_2,
        res_array2,
        res_array3,
        instrument_name,
        instrument_number,
        trace_label,
        reserved1,
        reserved2,
        wave_array_count,
        pnts_per_screen,
        first_valid_pnt,
        last_valid_pnt,
        first_point,
        sparsing_factor,
        segment_index,
        subarray_count,
        sweeps_per_acq,
        points_per_pair,
        pair_offset,
        vertical_gain,
        vertical_offset,
        max_value,
        min_value,
        nominal_bits,
        nom_subarray_count,
        horiz_interval,
        horiz_offset,
        pixel_offset,
        vertunit,
        horunit,
        horiz_uncertainty,
        trigger_time,
        acq_duration,
        record_type,
        processing_done,
        reserved5,
        ris_sweeps,
        timebase,
        vert_coupling,
        probe_att,
        fixed_vert_gain,
        bandwidth_limit,
        vertical_vernier,
        acq_vert_offset,
        wave_source,
        file_size: location.file_size,
    })
}

/// USER_TEXT block that follows WAVEDESC; empty when the declared length is not positive.
pub(crate) fn read_user_text<R: Read + Seek>(
    reader: &mut ByteReader<'_, R>,
    header: &WaveformHeader,
) -> Result<Vec<u8>> {
    if header.user_text <= 0 {
        return Ok(Vec::new());
    }
    let len = header.user_text as u64;
    reader.ensure_available(len)?;
    reader.read_bytes(len as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_time_display() {
        let time = TriggerTime {
            seconds: 5.25,
            minutes: 7,
            hours: 13,
            day: 2,
            month: 11,
            year: 2018,
            unused: 0,
        };
        assert_eq!(time.to_string(), "2018-11-02 13:07:05.250000");
    }

    #[test]
    fn descriptor_length_matches_field_widths() {
        // identity, enums, block lengths, names, geometry, scaling, timing,
        // units, trigger time, trailing enums and floats
        let widths = [
            16 + 16,
            2 + 2,
            10 * 4,
            16 + 4 + 16 + 2 + 2,
            9 * 4 + 2 + 2,
            4 * 4 + 2 + 2,
            4 + 8 + 8,
            48 + 48 + 4,
            8 + 4 + 2 + 2,
            4 + 2 + 2 + 2 + 2 + 2 + 2 + 4 + 2 + 2 + 4 + 4 + 2,
        ];
        assert_eq!(widths.iter().sum::<u64>(), DESCRIPTOR_LENGTH);
    }
}

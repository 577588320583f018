// src/enums.rs
// Enumerated WAVEDESC fields and their labels

use crate::engineering;
use crate::error::{Result, TrcError};

/// Declares a code-indexed enum together with its label table. Variants are
/// listed in code order starting at zero.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$($name::$variant),+];
            const LABELS: &'static [&'static str] = &[$($label),+];

            /// Resolve a raw code, failing when it falls outside the table.
            pub fn from_code(code: i16) -> Result<Self> {
                usize::try_from(code)
                    .ok()
                    .and_then(|index| Self::VARIANTS.get(index).copied())
                    .ok_or(TrcError::EnumOutOfRange { field: $field, code })
            }

            pub fn code(self) -> i16 {
                self as i16
            }

            pub fn label(self) -> &'static str {
                Self::LABELS[self as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum! {
    /// Sample width of the data arrays.
    CommType, "COMM_TYPE" {
        Byte => "byte",
        Word => "word",
    }
}

coded_enum! {
    /// Byte order of every multi-byte field after COMM_ORDER is known.
    CommOrder, "COMM_ORDER" {
        HiFirst => "HIFIRST",
        LoFirst => "LOFIRST",
    }
}

coded_enum! {
    RecordType, "RECORD_TYPE" {
        SingleSweep => "single sweep",
        Interleaved => "interleaved",
        Histogram => "histogram",
        Graph => "graph",
        FilterCoefficient => "filter_coefficient",
        Complex => "complex",
        Extrema => "extrema",
        SequenceObsolete => "sequence obsolete",
        CenteredRis => "centered RIS",
        PeakDetect => "peak detect",
    }
}

coded_enum! {
    ProcessingDone, "PROCESSING_DONE" {
        NoProcessing => "no processing",
        FirFilter => "fir filter",
        Interpolated => "interpolated",
        Sparsed => "sparsed",
        Autoscaled => "autoscaled",
        NoResult => "no result",
        Rolling => "rolling",
        Cumulative => "cumulative",
    }
}

coded_enum! {
    VertCoupling, "VERT_COUPLING" {
        Dc50Ohms => "DC 50 Ohms",
        Ground => "ground",
        Dc1MOhm => "DC 1MOhm",
        GroundAlt => "ground",
        Ac1MOhm => "AC 1MOhm",
    }
}

coded_enum! {
    BandwidthLimit, "BANDWIDTH_LIMIT" {
        Off => "off",
        On => "on",
    }
}

impl CommType {
    /// Bytes per stored sample.
    pub fn sample_width(self) -> usize {
        match self {
            CommType::Byte => 1,
            CommType::Word => 2,
        }
    }
}

/// A field whose label is computed from its code rather than looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedLabel {
    code: i16,
    label: String,
}

impl DerivedLabel {
    pub fn code(&self) -> i16 {
        self.code
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for DerivedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

const EXTERNAL_TIMEBASE: i16 = 100;
const DIVISIONS: [f64; 3] = [1.0, 2.0, 5.0];

/// Per-division value in the 1-2-5 sequence, offset by `bias` decades.
fn one_two_five(code: i16, bias: i32) -> f64 {
    let code = i32::from(code);
    let mantissa = DIVISIONS[code.rem_euclid(3) as usize];
    mantissa * 10f64.powi(code.div_euclid(3) - bias)
}

/// TIMEBASE label, e.g. `"500 nS/div"`, or `"EXTERNAL"` for code 100.
pub fn timebase(code: i16, horizontal_unit: &str) -> DerivedLabel {
    let label = if code == EXTERNAL_TIMEBASE {
        "EXTERNAL".to_string()
    } else {
        let per_div = one_two_five(code, 12);
        format!("{}{}/div", engineering::format(per_div), horizontal_unit)
    };
    DerivedLabel { code, label }
}

/// FIXED_VERT_GAIN label, e.g. `"50 mV/div"`.
pub fn fixed_vert_gain(code: i16, vertical_unit: &str) -> DerivedLabel {
    let per_div = one_two_five(code, 6);
    DerivedLabel {
        code,
        label: format!("{}{}/div", engineering::format(per_div), vertical_unit),
    }
}

/// WAVE_SOURCE label: the 1-based channel name.
pub fn wave_source(code: i16) -> DerivedLabel {
    DerivedLabel {
        code,
        label: format!("C{}", i32::from(code) + 1),
    }
}

use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, TempDir};
use trc_reader::{decode_file, TrcError};

use shared::{Order, TraceBuilder};

fn write_trace(builder: &TraceBuilder, order: Order) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&builder.build(order)).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn decode_from_path() {
    let file = write_trace(&TraceBuilder::single(vec![2, 4, 6]), Order::Little);
    let trace = decode_file(file.path()).unwrap();
    assert_eq!(trace.primary.len(), 3);
    assert_eq!(trace.header.instrument_name, "LECROYWR640Zi");
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = decode_file(dir.path().join("non_existent.trc"));
    assert!(matches!(result, Err(TrcError::Io(_))));
}

#[test]
fn single_sweep_csv() {
    let builder = TraceBuilder {
        wave_array_2: true,
        secondary: vec![0, 1, 2, 3],
        ..TraceBuilder::single(vec![10, 20, 30, 40])
    };
    let file = write_trace(&builder, Order::Big);
    let trace = decode_file(file.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("sweep.csv");
    trace.write_csv(&csv).unwrap();

    let content = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Time,Primary,Secondary");
    assert!(lines[1].ends_with(",4.75,-0.25"), "{}", lines[1]);
}

#[test]
fn sequence_csv() {
    let file = write_trace(&TraceBuilder::sequence(2, (0..6).collect()), Order::Little);
    let trace = decode_file(file.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("sequence.csv");
    trace.write_csv(&csv).unwrap();

    let content = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "Segment,Sample,Time,Primary");
    assert!(lines[4].starts_with("1,0,"), "{}", lines[4]);
}

#[test]
fn csv_by_segment() {
    let file = write_trace(&TraceBuilder::sequence(3, (0..12).collect()), Order::Big);
    let trace = decode_file(file.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("segments.csv");
    trace.write_csv_by_segment(&csv).unwrap();

    let content = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Sample,Segment0,Segment1,Segment2");
    assert_eq!(lines[1], "0,-0.25,1.75,3.75");
}

#[test]
fn csv_by_segment_single_sweep() {
    let file = write_trace(&TraceBuilder::single(vec![1, 3]), Order::Little);
    let trace = decode_file(file.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("single.csv");
    trace.write_csv_by_segment(&csv).unwrap();

    let content = fs::read_to_string(&csv).unwrap();
    assert_eq!(content, "Sample,Segment0\n0,0.25\n1,1.25\n");
}

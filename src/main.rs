// src/main.rs
// Command-line front end for TRC Reader

use std::env;
use std::process;

use tracing_subscriber::EnvFilter;
use trc_reader::{decode_file, DecodedWaveform};

fn print_usage() {
    eprintln!("Usage: trc_reader <command> <trc_file> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>                Display TRC file information");
    eprintln!("  convert <file> <output>    Convert TRC to CSV");
    eprintln!("  segments <file> <output>   Export segments as columns to CSV");
    eprintln!("  extract <file> <segment>   Extract a single segment to stdout");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  trc_reader info C1Trace00000.trc");
    eprintln!("  trc_reader convert C1Trace00000.trc output.csv");
    eprintln!("  trc_reader segments C1Trace00000.trc segments.csv");
    eprintln!("  trc_reader extract C1Trace00000.trc 0 > segment0.txt");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let input_file = &args[2];

    let trace = match decode_file(input_file) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Error loading TRC file '{}': {}", input_file, e);
            process::exit(1);
        }
    };

    match command.as_str() {
        "info" => {
            print_file_info(input_file, &trace);
        }

        "convert" => {
            let output_file = require_arg(&args, 3, "output file");
            if let Err(e) = trace.write_csv(output_file) {
                eprintln!("Error writing CSV file '{}': {}", output_file, e);
                process::exit(1);
            }

            println!("Successfully converted {} to {}", input_file, output_file);
            println!("Total samples written: {}", trace.primary.len());
        }

        "segments" => {
            let output_file = require_arg(&args, 3, "output file");
            if let Err(e) = trace.write_csv_by_segment(output_file) {
                eprintln!("Error writing segment CSV file '{}': {}", output_file, e);
                process::exit(1);
            }

            println!(
                "Successfully exported {} segments to {}",
                trace.segment_count(),
                output_file
            );
        }

        "extract" => {
            let segment_arg = require_arg(&args, 3, "segment number");
            let segment: usize = match segment_arg.parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("Error: Invalid segment number '{}'", segment_arg);
                    process::exit(1);
                }
            };

            match trace.segment(segment) {
                Some((time, values)) => {
                    println!("# Segment {} from {}", segment, input_file);
                    println!("# Time ({}), Value ({})", trace.header.horunit, trace.header.vertunit);
                    for (t, v) in time.iter().zip(values.iter()) {
                        println!("{:.12e}, {:.6e}", t, v);
                    }
                }
                None => {
                    eprintln!(
                        "Error: Segment {} not found (file has {} segments)",
                        segment,
                        trace.segment_count()
                    );
                    process::exit(1);
                }
            }
        }

        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            process::exit(1);
        }
    }
}

fn require_arg<'a>(args: &'a [String], index: usize, what: &str) -> &'a str {
    match args.get(index) {
        Some(arg) => arg,
        None => {
            eprintln!("Error: Missing {} argument", what);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_file_info(path: &str, trace: &DecodedWaveform) {
    let h = &trace.header;

    println!("TRC File Information");
    println!("====================");
    println!();
    println!("File: {}", path);
    println!("Descriptor: {} ({})", h.descriptor_name, h.template_name);
    println!("Instrument: {} #{}", h.instrument_name, h.instrument_number);
    println!("Trace label: {}", h.trace_label);
    println!("Source: {}", h.wave_source);
    println!("File size: {} bytes", h.file_size);
    println!();

    println!("Acquisition Parameters:");
    println!("  Record type: {}", h.record_type);
    println!("  Processing: {}", h.processing_done);
    println!("  Data format: {} ({})", h.comm_type, h.comm_order);
    println!("  Segments: {}", trace.segment_count());
    println!("  Samples per segment: {}", trace.samples_per_segment());
    println!("  Total samples: {}", h.wave_array_count);
    println!("  Second array: {}", if trace.has_secondary() { "yes" } else { "no" });
    println!("  Sweeps per acquisition: {}", h.sweeps_per_acq);
    println!("  Trigger time: {}", h.trigger_time);
    println!();

    println!("Vertical:");
    println!("  Fixed gain: {}", h.fixed_vert_gain);
    println!("  Coupling: {}", h.vert_coupling);
    println!("  Bandwidth limit: {}", h.bandwidth_limit);
    println!("  Probe attenuation: {}", h.probe_att);
    println!("  Gain: {} {}/LSB", h.vertical_gain, h.vertunit);
    println!("  Offset: {} {}", h.vertical_offset, h.vertunit);
    println!("  Range: {} to {} {}", h.min_value, h.max_value, h.vertunit);
    println!();

    println!("Horizontal:");
    println!("  Timebase: {}", h.timebase);
    println!(
        "  Sample interval: {:.3e} {} ({:.3} MHz sample rate)",
        h.horiz_interval,
        h.horunit,
        1.0 / f64::from(h.horiz_interval) / 1e6
    );
    println!("  Offset: {:.6e} {}", h.horiz_offset, h.horunit);
    println!("  Acquisition duration: {:.6e} {}", h.acq_duration, h.horunit);
    println!();

    if !trace.user_text.is_empty() {
        println!("User text: {}", String::from_utf8_lossy(&trace.user_text));
        println!();
    }

    // Show statistics for first few segments
    println!("Segment Statistics (first {} segments):", trace.segment_count().min(3));
    for i in 0..trace.segment_count().min(3) {
        if let Some((_, values)) = trace.segment(i) {
            if values.is_empty() {
                continue;
            }
            let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let avg = values.sum() / values.len() as f64;
            let rms = (values.iter().map(|&x| x * x).sum::<f64>() / values.len() as f64).sqrt();

            println!(
                "  Segment {}: min={:.3}, max={:.3}, avg={:.3}, rms={:.3}",
                i, min, max, avg, rms
            );
        }
    }
}

//! Benchmarks for the response-reading hot path.
//!
//! ```bash
//! cargo bench -p espcmd-protocol
//! ```
//!
//! - `decode_lines_N` - Split a buffered reply of N data lines
//! - `session_N` - Run a full session over a scripted reply of N data lines

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use espcmd_protocol::{
    classify, execute, AtCommand, LineCodec, MemorySink, ScriptedTransport, SessionConfig,
};

fn access_point_line(i: usize) -> String {
    format!(
        "+CWLAP:(3,\"network-{}\",-{},\"aa:bb:cc:dd:ee:{:02x}\",{})",
        i,
        40 + i % 50,
        i % 256,
        1 + i % 13
    )
}

fn bench_decode_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_lines");

    for line_count in [1usize, 16, 128].iter() {
        let mut reply = Vec::new();
        for i in 0..*line_count {
            reply.extend_from_slice(access_point_line(i).as_bytes());
            reply.extend_from_slice(b"\r\n");
        }
        reply.extend_from_slice(b"\r\nOK\r\n");

        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(line_count), &reply, |b, reply| {
            b.iter(|| {
                let mut codec = LineCodec::new();
                codec.push(black_box(reply));
                let mut terminal = 0;
                while let Ok(Some(line)) = codec.decode_line() {
                    if classify(&line).is_terminal() {
                        terminal += 1;
                    }
                }
                black_box(terminal)
            });
        });
    }

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let config = SessionConfig::default();
    let command = AtCommand::new("AT+CWLAP").expect("valid command");

    for line_count in [1usize, 16, 128].iter() {
        let mut lines: Vec<String> = (0..*line_count).map(access_point_line).collect();
        lines.push("OK".to_string());

        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(line_count), &lines, |b, lines| {
            b.iter(|| {
                let mut transport = ScriptedTransport::from_lines(lines.iter().cloned());
                let mut sink = MemorySink::new();
                black_box(execute(&config, &mut transport, &mut sink, &command))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_lines, bench_session);
criterion_main!(benches);

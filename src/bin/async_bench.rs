//! Peripheral CLI benchmark for `AsyncSink`.
//!
//! Follows spdlog's `bench/async_bench.cpp`: same argument
//! shape (`messages threads queue_size iterations`), same validation rules
//! (all four must be positive, `queue_size` must not exceed `MAX_CAPACITY`),
//! same "spawn `threads` producers splitting `messages` as evenly as
//! possible, time the wall-clock of the whole run" measurement.

use logforge::logger::Logger;
use logforge::queue::MAX_CAPACITY;
use logforge::sink::{AsyncSink, AsyncSinkConfig, NullSink};
use std::sync::Arc;
use std::time::Instant;

fn usage(program: &str) -> String {
    format!("Usage: {program} <messages> <threads> <queue_size> <iterations>")
}

fn parse_positive(args: &[String], index: usize, default: usize) -> Option<usize> {
    match args.get(index) {
        None => Some(default),
        Some(raw) => raw.parse::<usize>().ok().filter(|v| *v > 0),
    }
}

fn run_once(messages: usize, threads: usize, queue_size: usize) {
    let sink = Arc::new(
        AsyncSink::new(AsyncSinkConfig::new().with_queue_size(queue_size).with_sink(Arc::new(NullSink::new())))
            .expect("validated queue_size"),
    );
    let logger = Arc::new(Logger::new("async_bench", vec![sink]));

    let per_thread = messages / threads;
    let remainder = messages % threads;

    let start = Instant::now();
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = logger.clone();
            let count = if t == 0 { per_thread + remainder } else { per_thread };
            std::thread::spawn(move || {
                for i in 0..count {
                    logger.log_fmt(None, logforge::Level::Info, format_args!("Hello logger: msg number {i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("producer thread panicked");
    }
    let elapsed = start.elapsed();
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { messages as f64 / secs } else { f64::INFINITY };
    println!("Elapsed: {secs:.3} secs\t{rate:.0}/sec");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "async_bench".to_string());

    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        println!("{}", usage(&program));
        return;
    }

    let messages = parse_positive(&args, 1, 1_000_000);
    let threads = parse_positive(&args, 2, 10);
    let queue_size = parse_positive(&args, 3, 8192);
    let iterations = parse_positive(&args, 4, 3);

    let (Some(messages), Some(threads), Some(queue_size), Some(iterations)) =
        (messages, threads, queue_size, iterations)
    else {
        eprintln!("Invalid input values");
        std::process::exit(1);
    };

    if queue_size > MAX_CAPACITY {
        eprintln!("Queue size too large. Max queue size is {MAX_CAPACITY}");
        std::process::exit(1);
    }

    println!("-------------------------------------------------");
    println!("Messages     : {messages}");
    println!("Threads      : {threads}");
    println!("Queue        : {queue_size} slots");
    println!("Total iters  : {iterations}");
    println!("-------------------------------------------------");

    for _ in 0..iterations {
        run_once(messages, threads, queue_size);
    }
}

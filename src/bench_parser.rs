use schedule_ingest::logging::init_tracing;
use schedule_ingest::schedule::{extract_periods_per_day, parse_schedule, parse_schedule_page};
use schedule_ingest::{ParserConfig, ParserContext};
use std::time::Instant;

fn main() {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .expect("Usage: bench_parser <html_file> [periods_per_day]");
    let html = std::fs::read_to_string(&path).expect("Failed to read HTML file");

    let config = ParserConfig::load_default().expect("Failed to load parser config");
    let context = ParserContext::new(config).expect("Failed to compile parser patterns");

    let periods_per_day = match args.next() {
        Some(value) => value
            .parse::<u32>()
            .expect("periods_per_day must be a positive integer"),
        None => extract_periods_per_day(&html, &context),
    };

    let iterations = 5;

    // Warm up
    let _ = parse_schedule(&html, periods_per_day, &context);
    let mut durations = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let courses = parse_schedule(&html, periods_per_day, &context);
        let elapsed = start.elapsed();
        durations.push(elapsed);
        println!(
            "Iteration {}: {:.3}ms ({} courses)",
            i + 1,
            elapsed.as_secs_f64() * 1000.0,
            courses.len(),
        );
    }

    let avg = durations.iter().map(|d| d.as_secs_f64()).sum::<f64>() / iterations as f64;
    let min = durations
        .iter()
        .map(|d| d.as_secs_f64())
        .fold(f64::INFINITY, f64::min);
    println!(
        "\nParser avg: {:.3}ms, min: {:.3}ms\n",
        avg * 1000.0,
        min * 1000.0
    );

    let mut schedule = parse_schedule_page(&html, &context);
    if schedule.periods_per_day != periods_per_day {
        schedule.courses = parse_schedule(&html, periods_per_day, &context);
        schedule.periods_per_day = periods_per_day;
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&schedule).expect("Failed to serialize schedule")
    );
}

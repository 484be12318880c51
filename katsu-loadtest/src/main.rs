//! katsu-loadtest - load generator for a running katsu-server
//!
//! Hammers the heaviest read path (nested donors with clinical data) with
//! concurrent authenticated GETs and reports status counts and latency.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "katsu-loadtest", about = "Load generator for katsu-server")]
struct Args {
    /// Base URL of the running server
    #[arg(long, default_value = "http://127.0.0.1:8008")]
    base_url: String,

    /// Bearer token presented on every request
    #[arg(long, default_value = "token_2")]
    token: String,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Requests issued per worker
    #[arg(long, default_value_t = 100)]
    requests: usize,
}

/// Outcome of a single request
struct Sample {
    status: u16,
    latency: Duration,
}

async fn worker(
    client: reqwest::Client,
    url: String,
    token: String,
    requests: usize,
) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(requests);
    for _ in 0..requests {
        let start = Instant::now();
        let status = match client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
        {
            Ok(response) => response.status().as_u16(),
            // Connection-level failures are counted as status 0
            Err(_) => 0,
        };
        samples.push(Sample {
            status,
            latency: start.elapsed(),
        });
    }
    samples
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let url = format!(
        "{}/v2/authorized/donor_with_clinical_data/",
        args.base_url.trim_end_matches('/')
    );

    println!(
        "Running {} workers x {} requests against {}",
        args.concurrency, args.requests, url
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let started = Instant::now();
    let mut handles = Vec::with_capacity(args.concurrency);
    for _ in 0..args.concurrency {
        handles.push(tokio::spawn(worker(
            client.clone(),
            url.clone(),
            args.token.clone(),
            args.requests,
        )));
    }

    let mut samples = Vec::with_capacity(args.concurrency * args.requests);
    for handle in handles {
        samples.extend(handle.await?);
    }
    let wall = started.elapsed();

    report(&samples, wall);
    Ok(())
}

fn report(samples: &[Sample], wall: Duration) {
    let mut by_status: std::collections::BTreeMap<u16, usize> = std::collections::BTreeMap::new();
    for s in samples {
        *by_status.entry(s.status).or_insert(0) += 1;
    }

    println!("\n--- results ---");
    println!("total requests: {}", samples.len());
    println!("wall time:      {:.2}s", wall.as_secs_f64());
    println!(
        "throughput:     {:.1} req/s",
        samples.len() as f64 / wall.as_secs_f64()
    );
    for (status, count) in &by_status {
        let label = if *status == 0 { "error" } else { "HTTP" };
        println!("{} {}: {}", label, status, count);
    }

    if !samples.is_empty() {
        let mut latencies: Vec<Duration> = samples.iter().map(|s| s.latency).collect();
        latencies.sort();
        let sum: Duration = latencies.iter().sum();
        let mean = sum / latencies.len() as u32;
        let p95 = latencies[(latencies.len() * 95 / 100).min(latencies.len() - 1)];
        println!(
            "latency min/mean/p95/max: {:?} / {:?} / {:?} / {:?}",
            latencies[0],
            mean,
            p95,
            latencies[latencies.len() - 1]
        );
    }
}

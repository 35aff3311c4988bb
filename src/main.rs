//! Bitcoin Vanity Address Generator CLI
//!
//! Usage:
//!   btc_vanity -p abc                   # Legacy address starting with "1abc"
//!   btc_vanity -p qqq -a p2wpkh -P end  # Native segwit address ending with "qqq"
//!   btc_vanity --batch -n 10 -a p2tr    # Ten random taproot addresses

use std::process;
use std::time::Duration;

use clap::Parser;

use btc_vanity::worker::{BatchResult, Progress};
use btc_vanity::{Config, SearchResult, UnitMessage, WorkerPool};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let performance = match config.performance() {
        Ok(performance) => performance,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let template = config.request(performance);
    let pattern = config.compiled_pattern();

    // Print startup info
    if !config.json {
        println!("Bitcoin Vanity Address Generator");
        println!("================================");
        println!("Type:       {}", config.address_type);
        if config.batch {
            println!("Mode:       batch");
        } else {
            println!("Pattern:    {} ({})", pattern.pattern(), pattern.position());
            println!(
                "Difficulty: {}",
                pattern.difficulty_description(config.address_type)
            );
        }
        println!("Workers:    {}", config.worker_count());
        println!("Target:     {} address(es)", config.count);
        println!();
    }

    // Create worker pool
    let mut pool = if config.batch {
        WorkerPool::spawn_batch(config.worker_count(), &template)
    } else {
        WorkerPool::spawn_search(config.worker_count(), &template)
    };

    // Set up ctrl-c handler
    let stop_flag = pool.stop_flag_clone();
    ctrlc_handler(stop_flag);

    if !config.json && !config.batch {
        println!("Searching... (Press Ctrl+C to stop)\n");
    }

    let mut found = 0;
    let mut generated = 0;
    let report_interval = Duration::from_secs(config.report_interval);

    loop {
        // Wait for a message or timeout for progress report
        match pool.recv_timeout(report_interval) {
            Some(message) => {
                if config.json {
                    print_json(&message);
                }
                match message {
                    UnitMessage::Match(result) => {
                        found += 1;
                        if !config.json {
                            print_result(&result, found);
                        }
                        if found >= config.count {
                            if !config.json {
                                println!("\nTarget reached! Found {} address(es).", found);
                            }
                            break;
                        }
                    }
                    UnitMessage::BatchResult(batch) => {
                        if !config.json {
                            print_batch(&batch, generated);
                        }
                        generated += batch.entries.len();
                    }
                    UnitMessage::Progress(progress) => {
                        log_progress(&progress);
                    }
                    UnitMessage::Error(report) => {
                        if !config.json {
                            eprintln!("Worker error: {}", report.message);
                        }
                    }
                }
            }
            None if pool.finished() => break,
            None => {
                if !config.json && !config.batch {
                    print_progress(&pool);
                }
            }
        }

        // Check if we should stop (ctrl-c was pressed)
        if pool.is_stopped() {
            if !config.json {
                println!("\nStopped by user.");
            }
            break;
        }
    }

    if !config.json {
        // Print final stats
        println!("\n--- Final Statistics ---");
        if config.batch {
            println!("Addresses generated:  {}", generated);
        } else {
            println!("Total keys searched:  {}", format_number(pool.total_attempts()));
            println!("Total matches found:  {}", pool.total_matches());
            if attempt_limit_reached(found, config.count, pool.is_stopped()) {
                println!("Attempt limit reached before the target.");
            }
        }
        println!("Workers:              {}", pool.num_units());
        println!("Time elapsed:         {:.2}s", pool.elapsed().as_secs_f64());
        println!(
            "Average speed:        {}/s",
            format_number(pool.attempts_per_second() as u64)
        );
    }

    pool.join();
}

/// A search that ends short of its target without being stopped has run
/// every unit out of attempts.
fn attempt_limit_reached(found: usize, target: usize, stopped: bool) -> bool {
    found < target && !stopped
}

fn print_json(message: &UnitMessage) {
    match serde_json::to_string(message) {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("cannot serialize message: {}", e),
    }
}

fn print_result(result: &SearchResult, index: usize) {
    println!("=== Match #{} ===", index);
    println!("Address:     {}", result.address);
    println!("Private Key: {}", result.private_key_hex);
    println!("WIF:         {}", result.private_key_wif);
    if let Some(attempts) = result.attempts {
        println!("Attempts:    {}", format_number(attempts));
    }
    if let Some(unit_id) = result.unit_id {
        println!("Worker:      {}", unit_id);
    }
    println!();
}

fn print_batch(batch: &BatchResult, offset: usize) {
    for (i, entry) in batch.entries.iter().enumerate() {
        println!("#{:<5} {}", offset + i + 1, entry.address);
        println!("       hex: {}", entry.private_key_hex);
        println!("       wif: {}", entry.private_key_wif);
    }
}

fn log_progress(progress: &Progress) {
    if progress.is_exhausted() {
        log::info!(
            "worker {} gave up after {} attempts",
            progress.unit_id,
            progress.attempts
        );
    } else {
        log::debug!(
            "worker {} at {} attempts ({})",
            progress.unit_id,
            progress.attempts,
            progress.current_address
        );
    }
}

fn print_progress(pool: &WorkerPool) {
    let attempts = pool.total_attempts();
    let rate = pool.attempts_per_second();
    let elapsed = pool.elapsed().as_secs();

    println!(
        "[{:>4}s] Searched {} keys ({}/s)",
        elapsed,
        format_number(attempts),
        format_number(rate as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    ctrlc::set_handler(move || {
        stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");
}

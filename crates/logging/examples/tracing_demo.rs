//! Demonstrates wiring the `logging` facade onto a `tracing-subscriber`
//! global default instead of the built-in stdout/stderr printer.
//!
//! Run with: `cargo run -p logging --example tracing_demo --features tracing`

fn main() {
    logging::install_tracing_subscriber().expect("install tracing subscriber");
    logging::set_verbosity(true, false);

    logging::info!("connecting to target.example:8000");
    logging::warning!("compressed-sparse adapter unavailable, falling back to plain sparse");
    logging::debug!("block size negotiated at {} bytes", 65536);
    logging::error!("session aborted: {}", "connection reset by peer");
}

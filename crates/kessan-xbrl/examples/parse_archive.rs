//! Extracts the headline figures from a downloaded filing archive.
//!
//! Run with:
//! ```bash
//! cargo run -p kessan-xbrl --example parse_archive -- path/to/S100XXXX.zip
//! ```

use kessan_xbrl::{MetricKey, XbrlExtractor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: parse_archive <ARCHIVE>")?;

    let bytes = std::fs::read(&path)?;
    let result = XbrlExtractor::new().extract_archive(&bytes)?;

    println!("=== {path} ===\n");
    for (label, bucket) in [
        ("Current period", &result.current_period),
        ("Previous period", &result.previous_period),
        ("Forecast", &result.forecast),
    ] {
        println!("{label}:");
        if bucket.is_empty() {
            println!("  (none)");
        }
        for (key, value) in bucket {
            println!("  {:<32} {value:>20.2}", key.display_name());
        }
        println!();
    }

    if let Some(growth) = result.current(MetricKey::RevenueGrowth) {
        println!("Revenue grew {growth:.2}% year over year");
    }

    Ok(())
}

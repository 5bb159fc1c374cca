//! Utility to inspect the frozen schema and print a sample encoding.
//!
//! The lookup tables are frozen artifacts of the original training
//! pipeline; this tool dumps them in a form that can be diffed against the
//! model artifact's feature list during an audit.

use deposit_predictor::encoder::{encode, UnknownLevelPolicy};
use deposit_predictor::models::RawRecord;
use deposit_predictor::schema;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Frozen schema ({} columns):", schema::EXPECTED_COLUMNS.len());
    for (idx, column) in schema::EXPECTED_COLUMNS.iter().enumerate() {
        println!("  {:>2}  {}", idx, column);
    }

    println!("\nJob buckets:");
    for (job, bucket) in schema::JOB_BUCKETS {
        println!("  {:<14} -> {}", job, bucket);
    }

    println!("\nAge bins (left-open, right-closed):");
    let mut lower = 0;
    for (upper, label) in schema::AGE_BINS {
        println!("  ({:>3}, {:>3}] -> {}", lower, upper, label);
        lower = *upper;
    }

    let sample = RawRecord {
        age: 35,
        job: "admin.".to_string(),
        marital: "single".to_string(),
        education: "tertiary".to_string(),
        default: "no".to_string(),
        balance: 1000,
        housing: "yes".to_string(),
        loan: "no".to_string(),
        contact: "cellular".to_string(),
        day: 15,
        month: "may".to_string(),
        duration: 300,
        campaign: 1,
        pdays: 999,
        previous: 0,
        poutcome: "unknown".to_string(),
    };
    let row = encode(&sample, UnknownLevelPolicy::ZeroFill)?;

    println!("\nSample encoding (age 35, admin., single, tertiary, may):");
    for name in row.names() {
        // names() iterates in canonical order, so this doubles as an
        // eyeball check of the ordering.
        if let Some(value) = row.get(name) {
            println!("  {:<34} {}", name, value);
        }
    }

    Ok(())
}

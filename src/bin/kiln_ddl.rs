//! kiln-ddl: Generate ClickHouse CREATE TABLE statements from JSON samples
//!
//! Usage:
//!   # Read from file, output to stdout
//!   kiln-ddl data.json --table-name products
//!
//!   # Read from stdin
//!   echo '{"id": 1, "price": 10.99}' | kiln-ddl --table-name products
//!
//!   # Write the statement to a file
//!   kiln-ddl data.json --table-name products --output products.sql
//!
//!   # Batch mode: every *.json in a folder becomes <stem>.sql
//!   kiln-ddl ./payloads --output ./ddl

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use clap::Parser;
use kiln::{GeneratorConfig, SchemaGenerator};
use std::io::Read;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "kiln-ddl")]
#[command(about = "Generate ClickHouse table definitions from JSON", long_about = None)]
struct Args {
    /// Input JSON file or folder (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Name for the generated table
    #[arg(long, short = 't', default_value = "json_table")]
    table_name: String,

    /// Maximum nesting depth to analyze (0 = unlimited)
    #[arg(long, default_value_t = 10)]
    max_depth: i32,

    /// Output file (or folder in batch mode); stdout if omitted
    #[arg(long, short = 'o')]
    output: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = GeneratorConfig {
        max_depth: args.max_depth,
        ..GeneratorConfig::default()
    };
    let generator = SchemaGenerator::new(config);

    let ddl = match &args.input {
        Some(input) if Path::new(input).is_dir() => {
            let Some(output) = &args.output else {
                bail!("--output is required when the input is a folder");
            };
            generator.generate_folder(input, output)?;
            eprintln!("Wrote one .sql file per .json file to {}", output);
            return Ok(());
        }
        Some(input) => generator.generate_from_file(input, &args.table_name)?,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            generator.generate_from_str(&json, &args.table_name)?
        }
    };

    if let Some(output) = &args.output {
        std::fs::write(output, &ddl)?;
        eprintln!("Schema written to {}", output);
    } else {
        println!("{}", ddl);
    }

    Ok(())
}

//! # Seed Data Generator
//!
//! Populates a ledger database through the service, exactly as a transport
//! would.
//!
//! ## Usage
//! ```bash
//! # One pickup point per allowed city, 3 receptions of 20 products each
//! cargo run -p pvz-api --bin seed
//!
//! # Custom amounts
//! cargo run -p pvz-api --bin seed -- --receptions 5 --products 50
//!
//! # Specify database path
//! cargo run -p pvz-api --bin seed -- --db ./data/pvz.db
//! ```
//!
//! ## Generated Data
//! - A moderator registers one pickup point per allowed city
//! - An employee opens, fills and closes `--receptions` receptions at each
//! - The last reception at each pickup point is left open
//! - Product types cycle through [`PRODUCT_TYPES`]

use anyhow::{bail, Context};
use std::env;

use pvz_api::{telemetry, PvzService, RequestContext, ServiceConfig};
use pvz_core::Role;

/// Categories accepted at reception.
const PRODUCT_TYPES: &[&str] = &["electronics", "clothes", "shoes"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let mut config = ServiceConfig::load().context("loading configuration")?;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut receptions: usize = 3;
    let mut products: usize = 20;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--receptions" | "-r" => {
                receptions = flag_value(&args, i)?
                    .parse()
                    .context("--receptions expects a number")?;
                i += 1;
            }
            "--products" | "-p" => {
                products = flag_value(&args, i)?
                    .parse()
                    .context("--products expects a number")?;
                i += 1;
            }
            "--db" | "-d" => {
                config.db_path = flag_value(&args, i)?.into();
                i += 1;
            }
            "--help" | "-h" => {
                println!("PVZ Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --receptions <N>  Receptions per pickup point (default: 3)");
                println!("  -p, --products <N>    Products per reception (default: 20)");
                println!("  -d, --db <PATH>       Database file path (default: $PVZ_DB_PATH or ./pvz.db)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    println!("PVZ Ledger Seed Data Generator");
    println!("==============================");
    println!("Database:   {}", config.db_path.display());
    println!("Receptions: {} per pickup point", receptions);
    println!("Products:   {} per reception", products);
    println!();

    let service = PvzService::from_config(&config)
        .await
        .context("opening the ledger database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let moderator = RequestContext::for_role(Role::Moderator);
    let employee = RequestContext::for_role(Role::Employee);

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    let cities = service.allowed_cities().as_slice().to_vec();
    for city in &cities {
        let pvz = service.create_pickup_point(&moderator, city).await?;
        let pvz_id = pvz.id.to_string();
        println!("  {} → {}", city, pvz_id);

        for n in 0..receptions {
            service.open_reception(&employee, &pvz_id).await?;

            for k in 0..products {
                let product_type = PRODUCT_TYPES[k % PRODUCT_TYPES.len()];
                service.add_product(&employee, &pvz_id, product_type).await?;
                generated += 1;
            }

            if n + 1 < receptions {
                service.close_last_reception(&employee, &pvz_id).await?;
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Verify through the report
    println!();
    println!("Report summary:");
    let report = service
        .list_report(&employee, None, None, Some(1), Some(30))
        .await?;
    for entry in &report {
        let total: usize = entry.receptions.iter().map(|r| r.products.len()).sum();
        let open = entry
            .receptions
            .iter()
            .filter(|r| r.reception.status.is_open())
            .count();
        println!(
            "  {} ({}): {} receptions, {} open, {} products",
            entry.pvz.city,
            entry.pvz.id,
            entry.receptions.len(),
            open,
            total
        );
    }

    service.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn flag_value(args: &[String], i: usize) -> anyhow::Result<&str> {
    match args.get(i + 1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} expects a value", args[i]),
    }
}

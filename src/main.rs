use anyhow::{bail, Result};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use lab_pricing::{
    export_filename, instruments_for, load_catalog, methods_for, resolve, Catalog, FileSource,
    Ledger, Selection,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("catalog") => run_catalog_summary(&args[2..]),
        Some("quote") => run_quote_session(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Lab Pricing v{}", lab_pricing::VERSION);
    println!();
    println!("Usage:");
    println!("  lab-pricing catalog <catalog.json> [rates.csv]   Show catalog summary");
    println!("  lab-pricing quote <catalog.json> [rates.csv]     Build a quote interactively");
}

/// Load the catalog from the given paths. The rate CSV (if given) is
/// resolved first; the JSON document is fatal when missing or malformed.
fn load_from_args(args: &[String]) -> Result<Catalog> {
    let json_path = match args.first() {
        Some(path) => path,
        None => bail!("missing <catalog.json> argument"),
    };

    let json = FileSource::new(json_path);
    let catalog = match args.get(1) {
        Some(csv_path) => {
            let csv = FileSource::new(csv_path);
            load_catalog(&json, Some(&csv))?
        }
        None => load_catalog(&json, None)?,
    };

    Ok(catalog)
}

fn run_catalog_summary(args: &[String]) -> Result<()> {
    println!("📚 Loading catalog...");
    let catalog = load_from_args(args)?;

    println!("✓ Catalog loaded");
    println!();
    println!("  Services:       {}", catalog.services.len());
    println!("  Instruments:    {}", catalog.instruments.len());
    println!("  Methods:        {}", catalog.methods.len());
    println!("  Customer types: {}", catalog.customer_types.len());
    println!("  Unit types:     {}", catalog.unit_types.len());
    println!("  Rate entries:   {}", catalog.rates.len());
    println!();

    for service in &catalog.services {
        let instruments = instruments_for(&catalog, &service.id);
        println!(
            "  {} ({}) — {} instrument(s) priced",
            service.name,
            service.id,
            instruments.len()
        );
    }

    Ok(())
}

fn run_quote_session(args: &[String]) -> Result<()> {
    println!("🧾 Lab Pricing — interactive quote builder");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let catalog = load_from_args(args)?;
    println!(
        "✓ Catalog loaded ({} rate entries)\n",
        catalog.rates.len()
    );
    print_commands();

    let mut ledger = Ledger::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_commands(),

            ["add", service, instrument, method, customer, unit, quantity] => {
                let quantity: f64 = match quantity.parse() {
                    Ok(q) => q,
                    Err(_) => {
                        println!("❌ Quantity must be a number");
                        continue;
                    }
                };
                let selection = Selection::new(*service, *instrument, *method, *customer, *unit);
                match ledger.add_item(&catalog, selection, quantity) {
                    Ok(item) => println!(
                        "✓ Added item #{}: {} × {:.2} = {:.2}",
                        item.id, item.quantity, item.rate, item.price
                    ),
                    Err(err) => println!("❌ {}", err),
                }
            }

            ["remove", id] => match id.parse::<u64>() {
                Ok(id) if ledger.remove_item(id) => println!("✓ Removed item #{}", id),
                Ok(id) => println!("❌ No item with id {}", id),
                Err(_) => println!("❌ Id must be a number"),
            },

            ["list"] => {
                if ledger.is_empty() {
                    println!("(quote is empty)");
                }
                for item in ledger.items() {
                    println!(
                        "  #{} {} / {} / {} / {} / {} — {} × {:.2} = {:.2}",
                        item.id,
                        catalog.service_name(&item.service),
                        catalog.instrument_name(&item.instrument),
                        catalog.method_name(&item.method),
                        catalog.customer_type_name(&item.customer_type),
                        catalog.unit_type_name(&item.unit_type),
                        item.quantity,
                        item.rate,
                        item.price
                    );
                }
            }

            ["total"] => println!("Total: ${:.2}", ledger.total()),

            ["rate", service, instrument, method, customer, unit] => {
                let selection = Selection::new(*service, *instrument, *method, *customer, *unit);
                match resolve(&catalog, &selection) {
                    Some(rate) => println!("Rate: {:.2}", rate),
                    None => println!("❌ No rate for that combination"),
                }
            }

            ["instruments", service] => {
                for entry in instruments_for(&catalog, service) {
                    println!("  {} — {}", entry.id, entry.name);
                }
            }

            ["methods", service, instrument] => {
                for entry in methods_for(&catalog, service, instrument) {
                    println!("  {} — {}", entry.id, entry.name);
                }
            }

            ["export", rest @ ..] => {
                let path = rest
                    .first()
                    .map(|p| p.to_string())
                    .unwrap_or_else(export_filename);
                let text = ledger.to_csv(&catalog)?;
                fs::write(&path, text)?;
                println!("✓ Exported {} item(s) to {}", ledger.len(), path);
            }

            _ => println!("❌ Unknown command (try 'help')"),
        }
    }

    println!("\n✅ Session closed — total ${:.2}", ledger.total());
    Ok(())
}

fn print_commands() {
    println!("Commands:");
    println!("  add <service> <instrument> <method> <customer> <unit> <qty>");
    println!("  remove <id>");
    println!("  rate <service> <instrument> <method> <customer> <unit>");
    println!("  instruments <service>");
    println!("  methods <service> <instrument>");
    println!("  list | total | export [path] | help | quit");
}

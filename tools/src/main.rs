//! ledger-runner: headless front end for the coffee loyalty ledger.
//!
//! Usage:
//!   ledger-runner add --name Ada --mobile 9876543210 --coffee 2,3,1
//!   ledger-runner find --query ada
//!   ledger-runner add-coffee --name Ada --amount 2
//!   ledger-runner list | analytics | export | report
//!   ledger-runner rollover [--month 2025-03]
//!   ledger-runner --ipc-mode            (one JSON command per stdin line)
//!
//! Common flags: --data-dir DIR, --store FILE, --report-dir DIR, --clients-dir DIR

use anyhow::{bail, Result};
use loyalty_core::{
    clock::Month,
    command::LedgerCommand,
    config::LedgerConfig,
    customer::CustomerRecord,
    event::LedgerEvent,
    export,
    ledger::{Analytics, Ledger},
    reward::{parse_mobile_number, parse_quantities},
    store::LedgerStore,
    types::{CoffeeCount, MobileNumber},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(serde::Serialize)]
struct CustomerView {
    name:          String,
    mobile_number: MobileNumber,
    coffee_count:  CoffeeCount,
    last_updated:  Option<Month>,
}

impl From<&CustomerRecord> for CustomerView {
    fn from(c: &CustomerRecord) -> Self {
        Self {
            name:          c.name.clone(),
            mobile_number: c.mobile_number,
            coffee_count:  c.coffee_count,
            last_updated:  c.last_updated_month,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Reply {
    Customer { customer: CustomerView },
    Customers { customers: Vec<CustomerView> },
    CoffeeUpdated { customer: CustomerView, reward_available: bool },
    RolledOver { month: Month, reset: usize },
    Analytics { analytics: Analytics },
    Exported { files: Vec<PathBuf> },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcResponse {
    ok:     Reply,
    events: Vec<LedgerEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = build_config(&args)?;
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut ledger = Ledger::open(LedgerStore::new(&config.store_path));
    if let Some(warning) = ledger.load_warning() {
        eprintln!("warning: {warning}; starting with an empty ledger");
    }
    // Start every session in the current month.
    if let Err(e) = ledger.roll_over_to_current_month() {
        eprintln!("warning: startup rollover not saved: {e}");
    }

    if ipc_mode {
        // stdout carries responses only.
        for event in ledger.drain_events() {
            log::info!("{}", event.describe());
        }
        return run_ipc_loop(&mut ledger, &config);
    }

    print_events(&mut ledger);
    let command = parse_command(&args)?;
    let reply = execute(&mut ledger, &config, command)?;
    print_reply(&reply);
    print_events(&mut ledger);
    Ok(())
}

fn build_config(args: &[String]) -> Result<LedgerConfig> {
    let data_dir = flag(args, "--data-dir").unwrap_or(".");
    let mut config = LedgerConfig::load(data_dir)?;
    if let Some(p) = flag(args, "--store") {
        config.store_path = p.into();
    }
    if let Some(p) = flag(args, "--report-dir") {
        config.report_dir = p.into();
    }
    if let Some(p) = flag(args, "--clients-dir") {
        config.clients_dir = p.into();
    }
    Ok(config)
}

fn parse_command(args: &[String]) -> Result<LedgerCommand> {
    let Some(sub) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("missing subcommand (add, find, add-coffee, list, rollover, analytics, export, report)");
    };
    let required = |name: &str| -> Result<String> {
        flag(args, name)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("{sub}: missing {name}"))
    };
    let command = match sub.as_str() {
        "add" => LedgerCommand::AddCustomer {
            name:   required("--name")?,
            mobile: required("--mobile")?,
            coffee: required("--coffee")?,
        },
        "find" => LedgerCommand::FindCustomer { query: required("--query")? },
        "add-coffee" => LedgerCommand::AddCoffee {
            name:   required("--name")?,
            amount: required("--amount")?
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("--amount: {e}"))?,
        },
        "list" => LedgerCommand::List,
        "rollover" => LedgerCommand::Rollover { month: flag(args, "--month").map(str::to_string) },
        "analytics" => LedgerCommand::Analytics,
        "export" => LedgerCommand::Export,
        "report" => LedgerCommand::Report,
        other => bail!("unknown subcommand: {other}"),
    };
    Ok(command)
}

/// Run one command against the ledger.
fn execute(ledger: &mut Ledger, config: &LedgerConfig, command: LedgerCommand) -> Result<Reply> {
    let reply = match command {
        LedgerCommand::AddCustomer { name, mobile, coffee } => {
            let name = name.trim();
            let mobile = parse_mobile_number(&mobile)?;
            let quantities = parse_quantities(&coffee)?;
            let record = ledger.add_or_replace_customer(name, mobile, &quantities)?;
            Reply::Customer { customer: (&record).into() }
        }
        LedgerCommand::FindCustomer { query } => {
            let record = ledger.find_customer(query.trim())?;
            Reply::Customer { customer: record.into() }
        }
        LedgerCommand::AddCoffee { name, amount } => {
            let update = ledger.add_coffee_to_customer(&name, amount)?;
            Reply::CoffeeUpdated {
                customer:         (&update.record).into(),
                reward_available: update.reward_available,
            }
        }
        LedgerCommand::List => Reply::Customers {
            customers: ledger.list_all_customers().iter().map(CustomerView::from).collect(),
        },
        LedgerCommand::Rollover { month } => {
            let month: Month = match month {
                Some(m) => m.parse()?,
                None => ledger.current_month(),
            };
            let reset = ledger.run_monthly_rollover(&month.to_string())?;
            Reply::RolledOver { month, reset }
        }
        LedgerCommand::Analytics => Reply::Analytics { analytics: ledger.analytics() },
        LedgerCommand::Export => {
            export::export_clients_data(ledger.list_all_customers(), &config.clients_dir)?;
            Reply::Exported {
                files: vec![
                    config.clients_dir.join(export::CLIENTS_JSON),
                    config.clients_dir.join(export::CLIENTS_CSV),
                ],
            }
        }
        LedgerCommand::Report => {
            let paths = export::write_monthly_report(ledger.list_all_customers(), &config.report_dir)?;
            Reply::Exported { files: vec![paths.csv, paths.json, paths.html] }
        }
        LedgerCommand::Quit => Reply::Quit,
    };
    Ok(reply)
}

fn run_ipc_loop(ledger: &mut Ledger, config: &LedgerConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let handle = stdin.lock();

    for line in handle.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (response, quit) = handle_ipc_line(ledger, config, &line);
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
        if quit {
            break;
        }
    }
    Ok(())
}

/// One request line in, one response line out. Errors are replies,
/// never loop exits.
fn handle_ipc_line(ledger: &mut Ledger, config: &LedgerConfig, line: &str) -> (serde_json::Value, bool) {
    let command: LedgerCommand = match serde_json::from_str(line) {
        Ok(c) => c,
        Err(e) => return (serde_json::json!({ "error": e.to_string() }), false),
    };
    let quit = command == LedgerCommand::Quit;
    match execute(ledger, config, command) {
        Ok(ok) => {
            let response = IpcResponse { ok, events: ledger.drain_events() };
            let value = serde_json::to_value(&response)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
            (value, quit)
        }
        Err(e) => {
            log::warn!("command failed: {e}");
            (serde_json::json!({ "error": e.to_string() }), quit)
        }
    }
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Customer { customer } => print_customer(customer),
        Reply::Customers { customers } if customers.is_empty() => println!("No customers found."),
        Reply::Customers { customers } => customers.iter().for_each(print_customer),
        Reply::CoffeeUpdated { customer, .. } => print_customer(customer),
        Reply::RolledOver { month, reset } => println!("Rollover to {month}: {reset} customer(s) reset"),
        Reply::Analytics { analytics } => {
            println!("=== ANALYTICS ===");
            println!("  total coffees sold: {}", analytics.total_coffees);
            println!("  top customer:       {}", analytics.top_customer.as_deref().unwrap_or("None"));
            println!("  month:              {}", analytics.month);
        }
        Reply::Exported { files } => {
            for f in files {
                println!("Customers exported to {}", f.display());
            }
        }
        Reply::Quit => {}
    }
}

fn print_customer(c: &CustomerView) {
    println!("{} - Mobile: {} - Coffee: {}", c.name, c.mobile_number, c.coffee_count);
}

fn print_events(ledger: &mut Ledger) {
    for event in ledger.drain_events() {
        println!("{}", event.describe());
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

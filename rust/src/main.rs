//! Operator CLI for the credential core. Useful for seeding accounts, checking
//! a stored hash by hand, and confirming which parameters a deployment uses.

use std::env;
use std::process::ExitCode;

use serde_json::json;
use todo_credentials::config::{load_from_env, CONFIG_ENV};
use todo_credentials::crypto::encoding::{ALGORITHM_ID, ARGON2_VERSION};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Commands:\n  hash-password <plaintext>\n  verify-password <plaintext> <encoded-hash>\n  needs-rehash <encoded-hash>\n  show-config\n\nSet {CONFIG_ENV} to a JSON config file to override the default parameters.");
}

fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let config = match load_from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("config load failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_level.as_deref());

    let hasher = match config.hasher() {
        Ok(h) => h,
        Err(err) => {
            eprintln!("hasher setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    match (args[1].as_str(), args.len()) {
        ("hash-password", 3) => match hasher.hash_password(&args[2]) {
            Ok(hash) => {
                println!("{hash}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("hashing failed: {err}");
                ExitCode::FAILURE
            }
        },
        ("verify-password", 4) => match hasher.verify_password(&args[2], &args[3]) {
            Ok(true) => {
                println!("match");
                ExitCode::SUCCESS
            }
            Ok(false) => {
                println!("no-match");
                ExitCode::FAILURE
            }
            Err(err) => {
                eprintln!("verification failed ({}): {err}", err.reason());
                ExitCode::FAILURE
            }
        },
        ("needs-rehash", 3) => match hasher.needs_rehash(&args[2]) {
            Ok(stale) => {
                println!("{}", if stale { "rehash" } else { "current" });
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("decode failed ({}): {err}", err.reason());
                ExitCode::FAILURE
            }
        },
        ("show-config", 2) => {
            let printable = json!({
                "algorithm": ALGORITHM_ID,
                "version": ARGON2_VERSION,
                "hashParameters": hasher.parameters(),
                "logLevel": config.log_level,
            });
            match serde_json::to_string_pretty(&printable) {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("render failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

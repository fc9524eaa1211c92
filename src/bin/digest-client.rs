/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

#[macro_use] extern crate log;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use time::UtcOffset;

use digestd::client::send_record;
use digestd::config::DEFAULT_LISTEN_ADDR;
use digestd::{ClientError, Kind, Record};

// Returns None when the user quits or input ends.
fn prompt<R: BufRead>(input: &mut R, question: &str) -> io::Result<Option<String>> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    if answer.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(answer.to_owned()))
}

fn run() -> Result<(), ClientError> {
    dotenvy::dotenv().ok();
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let addr = env::var("DIGEST_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("Type q anytime to exit.");

        let kind = loop {
            match prompt(&mut input, "Enter Action or Event?")? {
                Some(answer) => match answer.parse::<Kind>() {
                    Ok(kind) => break kind,
                    Err(_) => println!("Please enter either 'Action' or 'Event'."),
                },
                None => {
                    println!("Exiting the program.");
                    return Ok(());
                }
            }
        };

        let detail = match prompt(&mut input, "Enter details:")? {
            Some(detail) => detail,
            None => {
                println!("Exiting the program.");
                return Ok(());
            }
        };

        let record = Record::now(kind, detail, offset)?;
        println!("Waiting for confirmation...");
        match send_record(addr.as_str(), &record) {
            Ok(reply) => println!("Server response: {}", reply),
            Err(err) => error!("Failed to send {} to {}: {}", record.kind, addr, err),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        error!("{}", err);
        process::exit(1);
    }
}

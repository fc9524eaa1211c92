/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

#[macro_use] extern crate log;

use std::net::TcpListener;
use std::process;
use time::UtcOffset;

use digestd::{Config, DigestServer, Error, SmtpMailer};

fn run() -> Result<(), Error> {
    info!("Starting up...");

    if let Err(err) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", err);
    }

    // The local offset can only be read while the process is single threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("Could not determine local time zone, using UTC");
        UtcOffset::UTC
    });

    let config = Config::from_env()?;
    let mailer = SmtpMailer::new(&config.mail)?;
    let server = DigestServer::new(mailer, config.server.interval, offset);

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || shutdown.shutdown())?;

    let listener = TcpListener::bind(&config.server.listen_addr)?;
    info!("Listening on {}", listener.local_addr()?);
    server.listen(listener, config.server.read_timeout)?;

    let undelivered = server.run();
    if !undelivered.is_empty() {
        error!("Exiting with {} records that were never delivered", undelivered.len());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{}", err);
        process::exit(1);
    }
}

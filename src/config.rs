/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:5000";
pub const DEFAULT_INTERVAL_MINUTES: u64 = 1;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub sender: String,
    pub recipient: String,
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub interval: Duration,
    pub read_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mail: MailConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Required: `SENDER_EMAIL`, `RECIPIENT_EMAIL`, `EMAIL_PASSWORD`.
    /// Optional: `SMTP_HOST`, `SMTP_PORT`, `DIGEST_LISTEN_ADDR`,
    /// `DIGEST_INTERVAL_MINUTES`, `DIGEST_READ_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, Error> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(Error::MissingVar(name));

        let mail = MailConfig {
            sender: required("SENDER_EMAIL")?,
            recipient: required("RECIPIENT_EMAIL")?,
            password: required("EMAIL_PASSWORD")?,
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_owned()),
            smtp_port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
        };

        let minutes: u64 = parse_or(&lookup, "DIGEST_INTERVAL_MINUTES", DEFAULT_INTERVAL_MINUTES)?;
        let interval = minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| Error::InvalidVar { name: "DIGEST_INTERVAL_MINUTES", value: minutes.to_string() })?;

        // Sockets reject a zero timeout.
        let read_timeout_secs: u64 = parse_or(&lookup, "DIGEST_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS)?;
        if read_timeout_secs == 0 {
            return Err(Error::InvalidVar { name: "DIGEST_READ_TIMEOUT_SECS", value: "0".to_owned() });
        }

        let server = ServerConfig {
            listen_addr: lookup("DIGEST_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned()),
            interval,
            read_timeout: Duration::from_secs(read_timeout_secs),
        };

        Ok(Config { mail, server })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| Error::InvalidVar { name, value }),
        None => Ok(default),
    }
}

/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::io::prelude::*;
use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::ClientError;
use crate::record::Record;

/// Submits one record and waits for the server's acknowledgment.
pub fn send_record<A: ToSocketAddrs>(addr: A, record: &Record) -> Result<String, ClientError> {
    let mut stream = TcpStream::connect(addr)?;
    let mut payload = record.encode()?;
    debug!("Sending {}", payload);
    payload.push('\n');
    stream.write_all(payload.as_bytes())?;
    stream.flush()?;

    let mut reply = String::new();
    if BufReader::new(stream).read_line(&mut reply)? == 0 {
        return Err(ClientError::NoAcknowledgement);
    }
    Ok(reply.trim_end().to_owned())
}

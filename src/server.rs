/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::io::prelude::*;
use std::io::{self, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::time::Duration;

use crate::command::Command;
use crate::error::MalformedRecord;
use crate::record::Record;

/// Largest record payload accepted on a single connection.
pub const MAX_RECORD_BYTES: u64 = 64 * 1024;

pub fn acknowledgment(position: usize) -> String {
    format!("Message #{} received successfully", position)
}

/// Reads exactly one newline-terminated record from the stream.
pub fn read_record(stream: &TcpStream, read_timeout: Duration) -> Result<Record, MalformedRecord> {
    stream.set_read_timeout(Some(read_timeout))?;
    let mut reader = BufReader::new(stream.take(MAX_RECORD_BYTES + 1));
    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    if read == 0 {
        return Err(MalformedRecord::Empty);
    }
    if read as u64 > MAX_RECORD_BYTES {
        return Err(MalformedRecord::TooLarge(MAX_RECORD_BYTES));
    }
    Record::decode(&line)
}

fn write_ack(stream: &mut TcpStream, position: usize, write_timeout: Duration) -> io::Result<()> {
    stream.set_write_timeout(Some(write_timeout))?;
    writeln!(stream, "{}", acknowledgment(position))?;
    stream.flush()
}

fn handle(mut stream: TcpStream, tx: &Sender<Command>, read_timeout: Duration) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_owned());

    let record = match read_record(&stream, read_timeout) {
        Ok(record) => record,
        Err(err) => {
            warn!("Dropping connection from {}: {}", peer, err);
            return;
        }
    };
    debug!("Received {:?} from {}", record, peer);

    let (reply_tx, reply_rx) = channel();
    if tx.send(Command::Append { record, reply: reply_tx }).is_err() {
        warn!("Digest server stopped, dropping record from {}", peer);
        return;
    }

    // Blocks while the control loop is mid-flush.
    match reply_rx.recv() {
        Ok(position) => {
            // The read timeout also bounds the ack write.
            if let Err(err) = write_ack(&mut stream, position, read_timeout) {
                warn!("Failed to acknowledge message #{} to {}: {}", position, peer, err);
            }
        }
        Err(_) => warn!("Digest server stopped before acknowledging {}", peer),
    }
}

// The server accepts one record per connection and pushes it to the digest loop, which owns the
// buffer. Connections are served one at a time so records reach the loop in arrival order.
fn server(listener: TcpListener, tx: Sender<Command>, read_timeout: Duration) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => handle(stream, &tx, read_timeout),
            Err(err) => error!("Failed to accept connection: {}", err),
        }
    }
}

pub fn spawn_server(listener: TcpListener, tx: Sender<Command>, read_timeout: Duration) -> io::Result<()> {
    thread::Builder::new()
        .name("listener".to_owned())
        .spawn(move || server(listener, tx, read_timeout))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::sync::mpsc::channel;

    use crate::record::Kind;

    fn listen() -> (TcpListener, std::net::SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[test]
    fn formats_acknowledgment() {
        assert_eq!(acknowledgment(3), "Message #3 received successfully");
    }

    #[test]
    fn reads_one_record() {
        let (listener, addr) = listen();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"{\"Date\": \"2024-01-01 10:00:00\", \"Type\": \"action\", \"detail\": \"shipped build\"}\n")
                .unwrap();
        });
        let (stream, _) = listener.accept().unwrap();
        let record = read_record(&stream, Duration::from_secs(5)).unwrap();
        assert_eq!(record.kind, Kind::Action);
        assert_eq!(record.detail, "shipped build");
        client.join().unwrap();
    }

    #[test]
    fn silent_client_times_out() {
        let (listener, addr) = listen();
        let _client = TcpStream::connect(addr).unwrap();
        let (stream, _) = listener.accept().unwrap();
        let err = read_record(&stream, Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, MalformedRecord::Io(_)));
    }

    #[test]
    fn closed_connection_is_empty() {
        let (listener, addr) = listen();
        drop(TcpStream::connect(addr).unwrap());
        let (stream, _) = listener.accept().unwrap();
        let err = read_record(&stream, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, MalformedRecord::Empty));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let (listener, addr) = listen();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let payload = vec![b'x'; MAX_RECORD_BYTES as usize + 16];
            // The server may hang up before everything is written.
            let _ = stream.write_all(&payload);
        });
        let (stream, _) = listener.accept().unwrap();
        let err = read_record(&stream, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, MalformedRecord::TooLarge(_)));
        drop(stream);
        client.join().unwrap();
    }

    #[test]
    fn forwards_record_and_writes_reply() {
        let (listener, addr) = listen();
        let (tx, rx) = channel();
        spawn_server(listener, tx, Duration::from_secs(5)).unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"{\"Date\": \"2024-01-01 10:00:05\", \"Type\": \"event\", \"detail\": \"deploy started\"}\n")
                .unwrap();
            let mut reply = String::new();
            BufReader::new(stream).read_line(&mut reply).unwrap();
            reply
        });

        match rx.recv().unwrap() {
            Command::Append { record, reply } => {
                assert_eq!(record.detail, "deploy started");
                reply.send(7).unwrap();
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(client.join().unwrap(), "Message #7 received successfully\n");
    }
}

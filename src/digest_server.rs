/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::io;
use std::mem;
use std::net::TcpListener;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use time::{OffsetDateTime, UtcOffset};

use crate::command::{Accept, Command, Flush, ShutdownHandle};
use crate::digest::{Digest, SUBJECT};
use crate::error::DeliveryError;
use crate::mailer::Mailer;
use crate::record::Record;
use crate::server::spawn_server;

/// Longest the control loop waits for a record before checking the clock again.
pub const ACCEPT_TIMEOUT: Duration = Duration::from_secs(1);

/**
 * Tracks time since the last successful flush.
 */
#[derive(Debug)]
pub struct DigestClock {
    last_flush: Instant,
    interval: Duration,
}

impl DigestClock {
    pub fn new(interval: Duration) -> Self {
        DigestClock { last_flush: Instant::now(), interval }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_flush) >= self.interval
    }

    pub fn reset(&mut self, now: Instant) {
        self.last_flush = now;
    }

    pub fn last_flush(&self) -> Instant {
        self.last_flush
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/**
 * Owns the record buffer and the digest clock. Records arrive over a channel and are only ever
 * touched by the thread that drives this server, so a batch is consumed by at most one flush.
 */
pub struct DigestServer<M> {
    mailer: M,
    buffer: Vec<Record>,
    clock: DigestClock,
    offset: UtcOffset,
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl<M: Mailer> DigestServer<M> {
    pub fn new(mailer: M, interval: Duration, offset: UtcOffset) -> Self {
        let (tx, rx) = channel();
        DigestServer {
            mailer,
            buffer: Vec::new(),
            clock: DigestClock::new(interval),
            offset,
            tx,
            rx,
        }
    }

    /// Starts accepting client connections on the listener.
    pub fn listen(&self, listener: TcpListener, read_timeout: Duration) -> io::Result<()> {
        spawn_server(listener, self.tx.clone(), read_timeout)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.tx.clone())
    }

    pub fn buffer(&self) -> &[Record] {
        &self.buffer
    }

    pub fn clock(&self) -> &DigestClock {
        &self.clock
    }

    /// Waits up to `timeout` for one record, appends it and acknowledges it with its position.
    pub fn accept_one(&mut self, timeout: Duration) -> Accept {
        match self.rx.recv_timeout(timeout) {
            Ok(Command::Append { record, reply }) => {
                info!("Received {} {:?} at {}", record.kind, record.detail, record.timestamp);
                self.buffer.push(record);
                let position = self.buffer.len();
                if reply.send(position).is_err() {
                    warn!("Listener went away before message #{} was acknowledged", position);
                }
                Accept::Received(position)
            }
            Ok(Command::Shutdown) => Accept::Shutdown,
            Err(RecvTimeoutError::Timeout) => Accept::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Accept::Shutdown,
        }
    }

    pub fn is_flush_due(&self) -> bool {
        self.is_flush_due_at(Instant::now())
    }

    pub fn is_flush_due_at(&self, now: Instant) -> bool {
        self.clock.is_due(now)
    }

    /// Mails the buffered records as one digest. The buffer is cleared and the clock reset only
    /// when delivery succeeds.
    pub fn flush(&mut self) -> Result<Flush, DeliveryError> {
        if self.buffer.is_empty() {
            debug!("No messages to send in digest");
            return Ok(Flush::Empty);
        }

        match self.deliver() {
            Ok(()) => {
                let count = self.buffer.len();
                self.buffer.clear();
                self.clock.reset(Instant::now());
                info!("Digest sent with {} items", count);
                Ok(Flush::Sent(count))
            }
            Err(err) => {
                error!("Failed to send digest of {} items: {}", self.buffer.len(), err);
                Err(err)
            }
        }
    }

    fn deliver(&self) -> Result<(), DeliveryError> {
        let generated_at = OffsetDateTime::now_utc().to_offset(self.offset);
        let body = Digest::new(&self.buffer).render(generated_at)?;
        self.mailer.send(SUBJECT, &body)
    }

    /// Runs the control loop until shutdown, then makes one last attempt to flush. Returns any
    /// records that could not be delivered.
    pub fn run(mut self) -> Vec<Record> {
        info!("Digest server started, interval {}s", self.clock.interval().as_secs());

        loop {
            if self.is_flush_due() {
                // Failures are logged by flush and retried on the next check.
                let _ = self.flush();
            }
            if self.accept_one(ACCEPT_TIMEOUT) == Accept::Shutdown {
                break;
            }
        }

        info!("Server shutting down");
        if !self.buffer.is_empty() && self.flush().is_err() {
            warn!("Dropping {} undelivered records", self.buffer.len());
        }
        mem::take(&mut self.buffer)
    }
}

/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::sync::mpsc::Sender;

use crate::record::Record;

/// Messages delivered to the digest server's control loop.
#[derive(Debug)]
pub enum Command {
    /// Append a record; the new buffer length is sent back on `reply`.
    Append { record: Record, reply: Sender<usize> },
    Shutdown,
}

/// Outcome of waiting for one inbound record.
#[derive(Debug, PartialEq, Eq)]
pub enum Accept {
    Received(usize),
    TimedOut,
    Shutdown,
}

/// Outcome of a successful flush.
#[derive(Debug, PartialEq, Eq)]
pub enum Flush {
    Empty,
    Sent(usize),
}

/// Asks a running digest server to stop after its current iteration.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    tx: Sender<Command>,
}

impl ShutdownHandle {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        ShutdownHandle { tx }
    }

    pub fn shutdown(&self) {
        if self.tx.send(Command::Shutdown).is_err() {
            debug!("Digest server already stopped");
        }
    }
}

// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// `read()` on stdin blocks, but the event loop must keep ticking for the
// ESC timeout, resize and close signals. A dedicated thread does the
// blocking reads and forwards byte chunks over a channel; the loop waits
// on the channel with `recv_timeout`.
//
// The thread polls with a short timeout so it notices the stop flag
// without being woken by input. On EOF or a read error it exits, which
// drops the sender and disconnects the channel: the loop treats that as
// "input is gone" and winds down.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Enough for a burst of typing or a medium paste per chunk.
const CHUNK: usize = 4096;

/// Stop-flag check interval in milliseconds.
const POLL_MS: i32 = 50;

/// Handle to the reader thread. Stops and joins it on drop.
#[derive(Debug)]
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start reading stdin on a new thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || read_loop(&tx, &flag))?;
        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; CHUNK];

    while !stop.load(Ordering::Relaxed) {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: one valid pollfd, count 1.
        let ready = unsafe { libc::poll(&raw mut pfd, 1, POLL_MS) };
        if ready < 0 {
            if io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                continue;
            }
            break;
        }
        if ready == 0 {
            continue;
        }

        // SAFETY: buf is valid for CHUNK bytes.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let Ok(n) = usize::try_from(n) else {
            if io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                continue;
            }
            break;
        };
        if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

#[cfg(not(unix))]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let mut buf = [0u8; CHUNK];
    while !stop.load(Ordering::Relaxed) {
        match io::stdin().lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn constants_are_sane() {
        assert!((1024..=65536).contains(&CHUNK));
        assert!((10..=500).contains(&POLL_MS));
    }

    #[test]
    fn spawn_then_stop_twice() {
        let (mut reader, _rx) = StdinReader::spawn().unwrap();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn drop_joins_thread() {
        let (reader, _rx) = StdinReader::spawn().unwrap();
        drop(reader);
    }

    #[test]
    fn channel_disconnects_after_stop() {
        let (mut reader, rx) = StdinReader::spawn().unwrap();
        reader.stop();
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}

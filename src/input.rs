// stdin is switched to raw mode and read one byte at a time on a helper thread;
// bytes travel to the game loop over a channel and are decoded there into keys
use std::io::{self, Read};
use std::os::unix::io::RawFd;
use std::sync::mpsc::Sender;
use std::thread;

use circular_buffer::CircularBuffer;
use termios::{tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW, VMIN, VTIME};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::session::Event;

type InputBuffer = CircularBuffer<64, u8>;

const ESC: u8 = 27;
const CSI: u8 = b'[';
const CTRL_C: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Play,
    Quit,
}

/// Turns raw terminal bytes into keys. Arrow keys arrive as three bytes
/// (`ESC [ A..D`) and may be split across reads.
#[derive(Debug)]
pub struct KeyDecoder {
    buffer: InputBuffer,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            buffer: InputBuffer::new(),
        }
    }

    pub fn push(&mut self, byte: u8) {
        // if the buffer is full, ignore the input
        if self.buffer.is_full() {
            return;
        }
        self.buffer.push_back(byte);
    }

    /// Next complete key, `None` when the buffer is drained or holds only the
    /// start of an escape sequence.
    pub fn next_key(&mut self) -> Option<Key> {
        while let Some(&byte) = self.buffer.front() {
            let key = match byte {
                ESC => match self.buffer.nth_front(1).copied() {
                    None => return None,
                    Some(CSI) => {
                        let code = *self.buffer.nth_front(2)?;
                        self.discard(3);
                        match code {
                            b'A' => Some(Key::ArrowUp),
                            b'B' => Some(Key::ArrowDown),
                            b'C' => Some(Key::ArrowRight),
                            b'D' => Some(Key::ArrowLeft),
                            _ => None,
                        }
                    }
                    // lone escape press
                    Some(_) => {
                        self.discard(1);
                        None
                    }
                },
                b'p' | b'P' | b' ' | b'\n' | b'\r' => {
                    self.discard(1);
                    Some(Key::Play)
                }
                b'q' | b'Q' | CTRL_C => {
                    self.discard(1);
                    Some(Key::Quit)
                }
                _ => {
                    self.discard(1);
                    None
                }
            };
            if key.is_some() {
                return key;
            }
        }
        None
    }

    fn discard(&mut self, count: usize) {
        for _ in 0..count {
            self.buffer.pop_front();
        }
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw terminal mode on stdin: no line buffering, no echo, Ctrl-C delivered as
/// a byte. The previous settings come back on drop.
pub struct RawMode {
    fd: RawFd,
    saved: Termios,
}

impl RawMode {
    pub fn enable() -> Result<Self> {
        let fd: RawFd = 0; // 0 is file descriptor for stdin
        let saved = Termios::from_fd(fd)
            .map_err(|err| Error::Terminal(format!("stdin is not a terminal: {err}")))?;
        let mut raw = saved;
        raw.c_lflag &= !(ICANON | ECHO | ISIG);
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        tcsetattr(fd, TCSANOW, &raw)
            .map_err(|err| Error::Terminal(format!("cannot switch to raw mode: {err}")))?;
        debug!("terminal in raw mode");
        Ok(Self { fd, saved })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = tcsetattr(self.fd, TCSANOW, &self.saved);
        debug!("terminal restored");
    }
}

/// Forward every stdin byte to `events` until EOF, a read error, or the
/// receiving side going away.
pub fn spawn_stdin_reader(events: Sender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buffer = [0u8; 1];
        loop {
            match stdin.read(&mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    trace!(byte = buffer[0], "stdin");
                    if events.send(Event::Input(buffer[0])).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(%err, "stdin reader stopped");
                    break;
                }
            }
        }
    })
}

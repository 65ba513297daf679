//! Channel-backed scanning: the scanner runs on a blocking worker and hands
//! frames to the parser through a bounded queue.
//!
//! The parser side ([`ScannerChannel`]) uses blocking receives, so it must be
//! driven from outside any async context, for example on the thread that owns
//! the runtime or inside `spawn_blocking`.

use std::io::Read;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::diagnostic::{Diagnostic, LexError};
use super::rules::Lexicon;
use super::scanner::{LexerOptions, ScanItem, Scanner};
use super::source::ReaderInput;
use super::token::{Token, TokenKind};
use super::tokenizer::{SignSplitter, TokenSource};
use super::Location;

/// Channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Maximum number of frames in flight. Values below 1 are raised to 1.
    pub capacity: usize,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// The parser's end of a scanner running on another thread.
pub struct ScannerChannel {
    frames: mpsc::Receiver<Result<ScanItem, LexError>>,
    stop: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
    lexicon: &'static Lexicon,
    signs: SignSplitter,
    diagnostics: Vec<Diagnostic>,
    eof: Option<Token>,
}

/// Starts scanning `reader` on a blocking worker of `handle`'s runtime.
pub fn spawn_scanner<R>(
    handle: &Handle,
    reader: R,
    options: LexerOptions,
    channel: ChannelOptions,
) -> ScannerChannel
where
    R: Read + Send + 'static,
{
    let lexicon = Lexicon::mysql();
    let (frame_tx, frame_rx) = mpsc::channel(channel.capacity.max(1));
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

    let task = handle.spawn_blocking(move || {
        let mut scanner = Scanner::new(lexicon.bank(), ReaderInput::new(reader), options);
        loop {
            match stop_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => {
                    debug!("scanner stopped on request");
                    return;
                }
            }
            let (item, last) = match scanner.next_item() {
                Ok(Some(item)) => {
                    let last = matches!(&item, ScanItem::Frame(f) if f.is_eof() && f.depth == 0);
                    (Ok(item), last)
                }
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "scanner failed");
                    (Err(e), true)
                }
            };
            if frame_tx.blocking_send(item).is_err() {
                debug!("parser dropped the frame channel");
                return;
            }
            if last {
                return;
            }
        }
    });

    ScannerChannel {
        frames: frame_rx,
        stop: stop_tx,
        task: Some(task),
        lexicon,
        signs: SignSplitter::default(),
        diagnostics: Vec::new(),
        eof: None,
    }
}

impl ScannerChannel {
    /// Receives and classifies frames until one yields a token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(eof) = &self.eof {
            return Ok(eof.clone());
        }
        if let Some(literal) = self.signs.take_pending() {
            return Ok(literal);
        }
        loop {
            let item = self.frames.blocking_recv().ok_or(LexError::Stopped)??;
            let frame = match item {
                ScanItem::Frame(frame) => frame,
                ScanItem::Diagnostic(d) => {
                    debug!(diagnostic = %d, "lexical diagnostic");
                    self.diagnostics.push(d);
                    continue;
                }
            };
            let classified = self.lexicon.classify(&frame);
            if let Some(d) = classified.diagnostic {
                debug!(diagnostic = %d, "lexical diagnostic");
                self.diagnostics.push(d);
            }
            if let Some(token) = classified.token {
                if token.kind == TokenKind::Eof {
                    self.eof = Some(token.clone());
                }
                return Ok(self.signs.split(token));
            }
        }
    }

    /// Signals the scanner to stop and stops accepting frames.
    ///
    /// A scanner blocked on a full channel wakes up once the channel closes.
    pub fn stop(&mut self) {
        // Capacity 1: a second stop request finds the slot taken, which is fine.
        let _ = self.stop.try_send(());
        self.frames.close();
        if self.eof.is_none() {
            self.eof = Some(Token::eof(Location::default()));
        }
    }

    /// Stops the scanner and returns its task handle, to await its exit.
    pub fn shutdown(mut self) -> Option<JoinHandle<()>> {
        self.stop();
        self.task.take()
    }

    /// Diagnostics received so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl TokenSource for ScannerChannel {
    fn next_token(&mut self) -> Result<Token, LexError> {
        Self::next_token(self)
    }

    fn stop(&mut self) {
        Self::stop(self);
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Drop for ScannerChannel {
    fn drop(&mut self) {
        let _ = self.stop.try_send(());
    }
}

use embedded_io_async::Read;
use heapless::String;
use tiny_nmea::MAX_SENTENCE_LENGTH;

use super::clock::Clock;

pub struct NmeaSentence {
    pub sentence: String<MAX_SENTENCE_LENGTH>,
    /// ms, clock time of the last byte
    pub timestamp: u64,
}

pub trait GPS {
    type Error;

    async fn next_nmea_sentence(&mut self) -> Result<NmeaSentence, Self::Error>;
}

/// Cuts a raw UART byte stream into sentences.
///
/// `$` starts a new sentence, a line feed or a full buffer ends it.
pub struct NmeaSentenceBuffer {
    sentence: String<MAX_SENTENCE_LENGTH>,
}

impl NmeaSentenceBuffer {
    pub fn new() -> Self {
        Self {
            sentence: String::new(),
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<String<MAX_SENTENCE_LENGTH>> {
        if byte == b'$' {
            self.sentence.clear();
        }
        if !byte.is_ascii() {
            // line noise, drop what we have
            self.sentence.clear();
            return None;
        }
        self.sentence.push(byte as char).ok();

        if byte == b'\n' || self.sentence.len() == MAX_SENTENCE_LENGTH {
            let sentence = core::mem::take(&mut self.sentence);
            if sentence.trim().is_empty() {
                return None;
            }
            return Some(sentence);
        }
        None
    }
}

impl Default for NmeaSentenceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq)]
pub enum UartGpsError<E> {
    Uart(E),
    EndOfStream,
}

pub struct UartNmeaReader<R: Read, C: Clock> {
    rx: R,
    clock: C,
    sentence_buffer: NmeaSentenceBuffer,
    read_buffer: [u8; MAX_SENTENCE_LENGTH],
    read_pos: usize,
    read_len: usize,
}

impl<R: Read, C: Clock> UartNmeaReader<R, C> {
    pub fn new(rx: R, clock: C) -> Self {
        Self {
            rx,
            clock,
            sentence_buffer: NmeaSentenceBuffer::new(),
            read_buffer: [0; MAX_SENTENCE_LENGTH],
            read_pos: 0,
            read_len: 0,
        }
    }
}

impl<R: Read, C: Clock> GPS for UartNmeaReader<R, C> {
    type Error = UartGpsError<R::Error>;

    async fn next_nmea_sentence(&mut self) -> Result<NmeaSentence, Self::Error> {
        loop {
            while self.read_pos < self.read_len {
                let byte = self.read_buffer[self.read_pos];
                self.read_pos += 1;
                if let Some(sentence) = self.sentence_buffer.push(byte) {
                    log_trace!("gps: {}", sentence.as_str());
                    return Ok(NmeaSentence {
                        sentence,
                        timestamp: self.clock.now_ms(),
                    });
                }
            }

            // cursor only moves once the read is done, the future may be dropped while waiting
            let len = self
                .rx
                .read(&mut self.read_buffer)
                .await
                .map_err(UartGpsError::Uart)?;
            self.read_pos = 0;
            self.read_len = len;
            if len == 0 {
                return Err(UartGpsError::EndOfStream);
            }
        }
    }
}

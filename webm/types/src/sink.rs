/*!
    Append-only byte sinks.
*/

use crate::Result;

/**
    An append-only byte stream.

    Sinks report their cumulative write position because container writers
    record byte offsets even when the stream cannot seek.
*/
pub trait ByteSink {
    /**
        Append bytes to the stream.
    */
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /**
        Cumulative bytes written so far.
    */
    fn position(&self) -> u64;

    /**
        Whether the sink supports repositioning. Live sinks return false and
        writers must not depend on seeking.
    */
    fn seekable(&self) -> bool;
}

/**
    In-memory sink collecting bytes into a `Vec`.
*/
#[derive(Debug, Default)]
pub struct BufferSink {
    data: Vec<u8>,
}

impl BufferSink {
    /**
        Create an empty buffer sink.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Bytes collected so far.
    */
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /**
        Consume the sink and return the collected bytes.
    */
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for BufferSink {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.data.len() as u64
    }

    fn seekable(&self) -> bool {
        false
    }
}

/**
    Sink adapter over any `std::io::Write`, counting bytes written.
*/
#[derive(Debug)]
pub struct WriterSink<W: std::io::Write> {
    inner: W,
    position: u64,
}

impl<W: std::io::Write> WriterSink<W> {
    /**
        Wrap a writer.
    */
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /**
        Flush the underlying writer.
    */
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /**
        Consume the sink and return the underlying writer.
    */
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> ByteSink for WriterSink<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seekable(&self) -> bool {
        false
    }
}

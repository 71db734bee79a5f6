//! Route `tracing` output to the browser console.

use std::io;
use tracing::Level;
use wasm_bindgen::JsValue;

/// Buffers formatted events and writes each complete line to `console.log`
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

/// Split off every complete line, leaving any partial tail in `buffer`
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let Some(last_newline) = buffer.iter().rposition(|byte| *byte == b'\n') else {
        return Vec::new();
    };
    let complete: Vec<u8> = buffer.drain(..=last_newline).collect();
    String::from_utf8_lossy(&complete)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn emit(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        for line in drain_lines(&mut self.buffer) {
            emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            emit(rest.trim_end());
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

pub(crate) fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Install the console subscriber once; later calls are no-ops
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .with_ansi(false)
        .without_time()
        .with_max_level(parse_level(level))
        .try_init();
}

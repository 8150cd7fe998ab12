//! `tracing` output routed to the browser console.

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Builds the filter from a directive string, falling back to `info` when it
/// does not parse.
pub fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(directives: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .without_time()
        .with_ansi(false)
        .with_writer(ConsoleMakeWriter)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Buffers one formatted event and emits it as a single console line on drop.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        emit(&self.line());
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    let level = line.trim_start();
    if level.starts_with("ERROR") {
        web_sys::console::error_1(&value);
    } else if level.starts_with("WARN") {
        web_sys::console::warn_1(&value);
    } else {
        web_sys::console::log_1(&value);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    eprintln!("{line}");
}

#[cfg(test)]
mod tests {
    use super::ConsoleWriter;
    use std::io::Write;

    #[test]
    fn writer_collects_one_line() {
        let mut w = ConsoleWriter::default();
        write!(w, " INFO web: globe ").unwrap();
        w.write_all(b"mounted\n").unwrap();
        assert_eq!(w.line(), " INFO web: globe mounted");
    }
}

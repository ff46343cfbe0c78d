//! Routing of `tracing` output to the host logger.
//!
//! The host registers one sink with [`wat_log_set_sink`]. The subscriber
//! installed by `wat_init` formats each event as one line and hands it to
//! the sink with the host level it maps to; with no sink the line goes to
//! stderr. Plugins log through the same pipeline with [`wat_log`].

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr, CString};
use std::io::{self, Write};
use std::sync::{PoisonError, RwLock};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use wat_core::WatConfig;

use crate::status::WatStatus;

/// Host logger levels.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatLogLevel {
    /// Debug detail (`trace` and `debug` events).
    Fine = 0,
    /// Normal operation.
    Info = 1,
    /// Recoverable problems.
    Warning = 2,
    /// Errors.
    Severe = 3,
}

impl WatLogLevel {
    /// The host level for a `tracing` level.
    pub fn from_tracing(level: &Level) -> Self {
        match *level {
            Level::ERROR => WatLogLevel::Severe,
            Level::WARN => WatLogLevel::Warning,
            Level::INFO => WatLogLevel::Info,
            _ => WatLogLevel::Fine,
        }
    }
}

impl TryFrom<i32> for WatLogLevel {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            0 => Ok(WatLogLevel::Fine),
            1 => Ok(WatLogLevel::Info),
            2 => Ok(WatLogLevel::Warning),
            3 => Ok(WatLogLevel::Severe),
            other => Err(other),
        }
    }
}

/// Host log sink: receives a level and one NUL-terminated line, valid only
/// for the duration of the call.
pub type WatLogSink = Option<extern "C" fn(level: WatLogLevel, line: *const c_char)>;

static SINK: RwLock<WatLogSink> = RwLock::new(None);

pub(crate) fn set_sink(sink: WatLogSink) {
    *SINK.write().unwrap_or_else(PoisonError::into_inner) = sink;
}

fn sink() -> WatLogSink {
    *SINK.read().unwrap_or_else(PoisonError::into_inner)
}

/// Install the host log sink. Null sends output back to stderr.
#[no_mangle]
pub extern "C" fn wat_log_set_sink(sink: WatLogSink) -> i32 {
    ffi_guard!({
        set_sink(sink);
        WatStatus::Ok as i32
    })
}

/// Log `message` at host `level` under the `wat::plugin` target.
#[no_mangle]
pub extern "C" fn wat_log(level: i32, message: *const c_char) -> i32 {
    ffi_guard!({
        let Ok(level) = WatLogLevel::try_from(level) else {
            return WatStatus::InvalidArgument as i32;
        };
        if message.is_null() {
            return WatStatus::InvalidArgument as i32;
        }
        // SAFETY: non-null, NUL-terminated per caller contract.
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
        match level {
            WatLogLevel::Fine => tracing::debug!(target: "wat::plugin", "{message}"),
            WatLogLevel::Info => tracing::info!(target: "wat::plugin", "{message}"),
            WatLogLevel::Warning => tracing::warn!(target: "wat::plugin", "{message}"),
            WatLogLevel::Severe => tracing::error!(target: "wat::plugin", "{message}"),
        }
        WatStatus::Ok as i32
    })
}

/// [`MakeWriter`] that tags each event's line with its host level.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostMakeWriter;

impl<'a> MakeWriter<'a> for HostMakeWriter {
    type Writer = HostWriter;

    fn make_writer(&'a self) -> HostWriter {
        HostWriter::new(WatLogLevel::Info)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> HostWriter {
        HostWriter::new(WatLogLevel::from_tracing(meta.level()))
    }
}

/// Buffers one formatted event and delivers it when dropped.
#[derive(Debug)]
pub struct HostWriter {
    level: WatLogLevel,
    line: Vec<u8>,
}

impl HostWriter {
    fn new(level: WatLogLevel) -> Self {
        Self {
            level,
            line: Vec::new(),
        }
    }

    fn deliver(&mut self) -> io::Result<()> {
        while matches!(self.line.last(), Some(b'\n' | b'\r')) {
            self.line.pop();
        }
        if self.line.is_empty() {
            return Ok(());
        }
        let line = std::mem::take(&mut self.line);
        match sink() {
            Some(sink) => {
                let line: Vec<u8> = line.into_iter().filter(|&b| b != 0).collect();
                let line = CString::new(line).map_err(io::Error::other)?;
                sink(self.level, line.as_ptr());
                Ok(())
            }
            None => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(&line)?;
                stderr.write_all(b"\n")
            }
        }
    }
}

impl Write for HostWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for HostWriter {
    fn drop(&mut self) {
        // Nowhere left to report a failed delivery.
        let _ = self.deliver();
    }
}

/// Install the process-wide subscriber.
///
/// The filter comes from `directive`, else the `WAT_LOG` environment
/// variable, else `info`. Returns `false` if a global subscriber was
/// already set (by an earlier call or by the host process).
pub fn init_logging(directive: Option<&str>) -> bool {
    let mut rejected = None;
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            rejected = Some(err.to_string());
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_env(WatConfig::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(HostMakeWriter)
        .with_ansi(false)
        .without_time()
        .try_init()
        .is_ok();
    if let Some(error) = rejected {
        tracing::warn!(directive, %error, "invalid log filter, using info");
    }
    installed
}

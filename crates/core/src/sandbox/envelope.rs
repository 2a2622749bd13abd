//! Connect streaming envelopes used by the in-sandbox process daemon.
//!
//! Each frame is a 5-byte header (flags `u8`, big-endian `u32` length)
//! followed by a JSON payload. The final frame carries the end-of-stream flag
//! and an optional `error` object.

use crate::sandbox::{CommandOutput, SandboxError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

pub const FLAG_END_STREAM: u8 = 0b0000_0010;
const HEADER_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub flags: u8,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn is_end_stream(&self) -> bool {
        self.flags & FLAG_END_STREAM != 0
    }
}

/// Frame a single request message.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.push(0);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Split a complete response body into frames.
pub fn decode_all(mut bytes: &[u8]) -> Result<Vec<Envelope>, SandboxError> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        if bytes.len() < HEADER_LEN {
            return Err(SandboxError::Protocol(format!(
                "truncated frame header ({} bytes)",
                bytes.len()
            )));
        }
        let flags = bytes[0];
        let len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        let rest = &bytes[HEADER_LEN..];
        if rest.len() < len {
            return Err(SandboxError::Protocol(format!(
                "frame declares {len} bytes but only {} remain",
                rest.len()
            )));
        }
        frames.push(Envelope {
            flags,
            payload: rest[..len].to_vec(),
        });
        bytes = &rest[len..];
    }
    Ok(frames)
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    event: Option<ProcessEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessEvent {
    data: Option<DataEvent>,
    end: Option<EndEvent>,
}

#[derive(Debug, Deserialize)]
struct DataEvent {
    stdout: Option<String>,
    stderr: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndEvent {
    #[serde(default)]
    exit_code: i32,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EndStream {
    error: Option<EndStreamError>,
}

#[derive(Debug, Deserialize)]
struct EndStreamError {
    code: Option<String>,
    message: Option<String>,
}

/// Fold the frames of a process stream into the command's output.
///
/// Start and keepalive events are skipped. A stream without an `end` event
/// or with an end-of-stream error is a protocol failure.
pub fn collect_output(frames: &[Envelope]) -> Result<CommandOutput, SandboxError> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = None;

    for frame in frames {
        if frame.is_end_stream() {
            let trailer: EndStream = serde_json::from_slice(&frame.payload)
                .map_err(|e| SandboxError::Protocol(format!("invalid trailer: {e}")))?;
            if let Some(err) = trailer.error {
                return Err(SandboxError::Protocol(format!(
                    "{}: {}",
                    err.code.unwrap_or_else(|| "unknown".to_string()),
                    err.message.unwrap_or_default()
                )));
            }
            continue;
        }

        let message: StartResponse = serde_json::from_slice(&frame.payload)
            .map_err(|e| SandboxError::Protocol(format!("invalid event: {e}")))?;
        let Some(event) = message.event else {
            continue;
        };

        if let Some(data) = event.data {
            if let Some(chunk) = data.stdout {
                stdout.extend(decode_chunk(&chunk)?);
            }
            if let Some(chunk) = data.stderr {
                stderr.extend(decode_chunk(&chunk)?);
            }
        }
        if let Some(end) = event.end {
            if let Some(error) = end.error.filter(|e| !e.is_empty()) {
                stderr.extend(error.into_bytes());
            }
            exit_code = Some(end.exit_code);
        }
    }

    let exit_code = exit_code
        .ok_or_else(|| SandboxError::Protocol("stream ended before the process exited".to_string()))?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
    })
}

fn decode_chunk(chunk: &str) -> Result<Vec<u8>, SandboxError> {
    STANDARD
        .decode(chunk)
        .map_err(|e| SandboxError::Protocol(format!("invalid base64 output: {e}")))
}

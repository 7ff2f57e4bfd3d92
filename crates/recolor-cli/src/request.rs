//! Request and reply handling for a single batch submission.

use std::io::{self, Read, Write};

use recolor_engine::ColorTriple;
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::transport::{Connection, Received};

const RUN_STATUS: &str = "run";
const DONE_STATUS: &str = "done";

#[derive(Serialize)]
struct RunRequest<'a> {
    status: &'static str,
    data: &'a [ColorTriple],
}

#[derive(Deserialize)]
struct Reply {
    status: String,
    #[serde(default)]
    data: Vec<ColorTriple>,
}

/// Parses a JSON list of colors. Channels outside `0..=255` are rejected.
pub(crate) fn read_batch<R: Read>(reader: R, origin: &str) -> Result<Vec<ColorTriple>, AppError> {
    serde_json::from_reader(reader).map_err(|error| {
        if error.is_io() {
            AppError::ReadInput {
                origin: origin.to_string(),
                source: io::Error::from(error),
            }
        } else {
            AppError::ParseBatch(error)
        }
    })
}

pub(crate) fn write_batch<W: Write>(writer: &mut W, batch: &[ColorTriple]) -> Result<(), AppError> {
    let mut payload = serde_json::to_vec(batch).map_err(AppError::SerialiseRequest)?;
    payload.push(b'\n');
    writer.write_all(&payload).map_err(AppError::WriteOutput)?;
    writer.flush().map_err(AppError::WriteOutput)
}

/// Sends `batch` as one `run` request and waits for the service to answer
/// within the connection's budget.
///
/// The service sends nothing back for requests it rejects, so silence is
/// reported as [`AppError::NoReply`].
pub(crate) fn submit(
    connection: &mut Connection,
    batch: &[ColorTriple],
) -> Result<Vec<ColorTriple>, AppError> {
    let request = RunRequest {
        status: RUN_STATUS,
        data: batch,
    };
    let payload = serde_json::to_vec(&request).map_err(AppError::SerialiseRequest)?;
    connection
        .send_line(&payload)
        .map_err(AppError::SendRequest)?;

    let line = match connection.receive_line().map_err(AppError::ReadReply)? {
        Received::Line(line) => line,
        Received::Closed => return Err(AppError::ConnectionClosed),
        Received::Expired => {
            let timeout_ms = u64::try_from(connection.budget().as_millis()).unwrap_or(u64::MAX);
            return Err(AppError::NoReply { timeout_ms });
        }
    };
    let reply: Reply = serde_json::from_slice(&line).map_err(AppError::ParseReply)?;
    if reply.status != DONE_STATUS {
        return Err(AppError::UnexpectedStatus(reply.status));
    }
    Ok(reply.data)
}

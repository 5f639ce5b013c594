//! Report archive extraction
//!
//! The download endpoint returns a ZIP holding one CSV file. The first
//! regular file entry is used; anything after it is ignored.

use super::types::ReportFile;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::io::{Cursor, Read};
use tracing::{debug, info};
use zip::ZipArchive;

/// Upper bound on the buffer preallocated from an entry's declared size
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Extract and decode the first file of a ZIP archive
pub fn extract_first_file(data: Bytes) -> Result<ReportFile> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::archive(format!("Failed to open ZIP: {e}")))?;
    let entries = archive.len();

    for index in 0..entries {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::archive(format!("Failed to read ZIP entry {index}: {e}")))?;

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut buf = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| Error::archive(format!("Failed to read {name}: {e}")))?;

        let content = String::from_utf8(buf)
            .map_err(|e| Error::decode(format!("{name} is not valid UTF-8: {e}")))?;

        info!("read file {name} from report archive");
        if entries > index + 1 {
            debug!("ignoring {} remaining archive entries", entries - index - 1);
        }

        return Ok(ReportFile { name, content });
    }

    Err(Error::archive("report archive contains no file"))
}

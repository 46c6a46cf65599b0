//! Single-stream HTTP GET into a local file with libcurl.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use super::{Fetcher, TransferError};

/// libcurl-backed fetcher. Each call truncates the destination and streams
/// the response body into it sequentially.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    pub connect_timeout: Duration,
    /// Abort when slower than 1 KiB/s for this long.
    pub low_speed_time: Duration,
    pub timeout: Duration,
    /// Optional receive cap in bytes per second.
    pub max_recv_speed: Option<u64>,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(6 * 3600),
            max_recv_speed: None,
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        let mut file = File::create(dest)?;
        let mut write_err: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        if let Some(speed) = self.max_recv_speed {
            easy.max_recv_speed(speed)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_err {
            return Err(TransferError::Io(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }

        file.flush()?;
        Ok(std::fs::metadata(dest)?.len())
    }
}

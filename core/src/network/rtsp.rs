use std::io;
use std::time::Duration;

use camprobe_common::error::ScanError;
use camprobe_common::models::Endpoint;
use camprobe_protocols::rtsp::{self, Method, RtspRequest, RtspResponse};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// One RTSP control connection. Every read and write is bounded by `timeout`.
pub struct RtspConnection {
    stream: TcpStream,
    endpoint: Endpoint,
    timeout: Duration,
    cseq: u32,
}

impl RtspConnection {
    pub async fn open(endpoint: Endpoint, limit: Duration) -> Result<Self, ScanError> {
        let stream = match timeout(limit, TcpStream::connect(endpoint.socket_addr())).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ScanError::network(endpoint, e)),
            Err(_) => return Err(ScanError::network(endpoint, timed_out("connect"))),
        };

        Ok(Self {
            stream,
            endpoint,
            timeout: limit,
            cseq: 0,
        })
    }

    pub async fn send(
        &mut self,
        method: Method,
        url: &str,
        authorization: Option<String>,
    ) -> Result<RtspResponse, ScanError> {
        self.cseq += 1;
        let request = RtspRequest::new(method, url, self.cseq).with_authorization(authorization);

        match timeout(self.timeout, self.stream.write_all(request.encode().as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ScanError::network(self.endpoint, e)),
            Err(_) => return Err(ScanError::network(self.endpoint, timed_out("write"))),
        }

        let raw = self.read_response().await?;
        RtspResponse::parse(&raw).map_err(|e| ScanError::mismatch(self.endpoint, e.to_string()))
    }

    async fn read_response(&mut self) -> Result<Vec<u8>, ScanError> {
        let mut raw: Vec<u8> = Vec::with_capacity(1024);
        let mut chunk = [0u8; 4096];

        loop {
            let n = match timeout(self.timeout, self.stream.read(&mut chunk)).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(ScanError::network(self.endpoint, e)),
                Err(_) => return Err(ScanError::network(self.endpoint, timed_out("read"))),
            };

            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            if rtsp::is_complete(&raw) {
                break;
            }
            if raw.len() > rtsp::MAX_RESPONSE_SIZE {
                return Err(ScanError::mismatch(self.endpoint, "response exceeds size limit"));
            }
        }

        if raw.is_empty() {
            return Err(ScanError::mismatch(self.endpoint, "connection closed without a response"));
        }
        Ok(raw)
    }
}

fn timed_out(stage: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{stage} timed out"))
}

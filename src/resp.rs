use std::io::Cursor;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    path::Path,
};

use maplit::hashmap;
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
};

pub struct Response {
    pub status: Status,
    pub headers: HashMap<String, String>,
    pub body: Box<dyn AsyncRead + Send + Unpin>,
}

impl Response {
    pub fn from_html(status: Status, html: impl Into<String>) -> Self {
        let bytes = html.into().into_bytes();

        let headers = hashmap! {
            "Content-Type".to_string() => "text/html; charset=utf-8".to_string(),
            "Content-Length".to_string() => bytes.len().to_string(),
        };

        Self {
            status,
            headers,
            body: Box::new(Cursor::new(bytes)),
        }
    }

    pub async fn from_file(path: &Path, file: File) -> anyhow::Result<Self> {
        let len = file.metadata().await?.len();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let headers = hashmap! {
            "Content-Type".to_string() => mime.to_string(),
            "Content-Length".to_string() => len.to_string(),
        };

        Ok(Self {
            status: Status::Ok,
            headers,
            body: Box::new(file),
        })
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        let headers = hashmap! {
            "Location".to_string() => location.into(),
            "Content-Length".to_string() => "0".to_string(),
        };

        Self {
            status: Status::MovedPermanently,
            headers,
            body: Box::new(Cursor::new(Vec::new())),
        }
    }

    pub fn status_and_headers(&self) -> String {
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect::<Vec<_>>()
            .join("");

        format!("HTTP/1.1 {}\r\n{headers}\r\n", self.status)
    }

    pub async fn write<O: AsyncWrite + Unpin>(mut self, stream: &mut O) -> anyhow::Result<()> {
        stream
            .write_all(self.status_and_headers().as_bytes())
            .await?;

        tokio::io::copy(&mut self.body, stream).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Status line and headers only, for HEAD requests.
    pub async fn write_head<O: AsyncWrite + Unpin>(self, stream: &mut O) -> anyhow::Result<()> {
        stream
            .write_all(self.status_and_headers().as_bytes())
            .await?;
        stream.flush().await?;

        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    Ok,
    MovedPermanently,
    NotFound,
    NotImplemented,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "200 OK"),
            Status::MovedPermanently => write!(f, "301 Moved Permanently"),
            Status::NotFound => write!(f, "404 Not Found"),
            Status::NotImplemented => write!(f, "501 Not Implemented"),
        }
    }
}

use std::collections::HashMap;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Head,
}

/// Anything other than GET or HEAD; the connection loop answers these
/// with `501 Not Implemented`.
#[derive(Debug, Clone, Error)]
#[error("unsupported method ({0})")]
pub struct UnsupportedMethod(pub String);

impl TryFrom<&str> for Method {
    type Error = UnsupportedMethod;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            m => Err(UnsupportedMethod(m.to_string())),
        }
    }
}

/// Reads one request from the stream. `None` means the client closed the
/// connection before sending a request line.
pub async fn parse_request(
    mut stream: impl AsyncBufRead + Unpin,
) -> anyhow::Result<Option<Request>> {
    let mut line_buffer = String::new();
    if stream.read_line(&mut line_buffer).await? == 0 {
        return Ok(None);
    }

    let mut parts = line_buffer.split_whitespace();

    let method: Method = parts
        .next()
        .ok_or(anyhow::anyhow!("missing method"))?
        .try_into()?;

    let path: String = parts
        .next()
        .ok_or(anyhow::anyhow!("missing path"))
        .map(Into::into)?;

    let mut headers = HashMap::new();

    loop {
        line_buffer.clear();
        stream.read_line(&mut line_buffer).await?;

        if line_buffer.is_empty() || line_buffer == "\n" || line_buffer == "\r\n" {
            break;
        }

        let (key, value) = line_buffer
            .split_once(':')
            .ok_or(anyhow::anyhow!("malformed header line"))?;

        headers.insert(key.to_string(), value.trim().to_string());
    }

    Ok(Some(Request {
        method,
        path,
        headers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use indoc::indoc;
    use maplit::hashmap;

    #[tokio::test]
    async fn no_headers() {
        let mut stream = Cursor::new("GET /foo HTTP/1.1\r\n");
        let req = parse_request(&mut stream).await.unwrap().unwrap();

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/foo");
        assert!(req.headers.is_empty());
    }

    #[tokio::test]
    async fn test_parse_request() {
        let mut stream = Cursor::new(indoc!(
            "
            GET /foo HTTP/1.1\r\n\
            Host: localhost\r\n\
            \r\n"
        ));
        let req = parse_request(&mut stream).await.unwrap().unwrap();

        assert_eq!(
            req,
            Request {
                method: Method::Get,
                path: "/foo".to_string(),
                headers: hashmap! { "Host".to_string() => "localhost".to_string() }
            }
        )
    }

    #[tokio::test]
    async fn header_values_may_contain_colons() {
        let mut stream = Cursor::new("GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n");
        let req = parse_request(&mut stream).await.unwrap().unwrap();

        assert_eq!(req.headers["Host"], "localhost:8080");
    }

    #[tokio::test]
    async fn parses_head_requests() {
        let mut stream = Cursor::new("HEAD /foo HTTP/1.1\r\n\r\n");
        let req = parse_request(&mut stream).await.unwrap().unwrap();

        assert_eq!(req.method, Method::Head);
    }

    #[tokio::test]
    async fn rejects_unsupported_methods() {
        let mut stream = Cursor::new("DELETE /foo HTTP/1.1\r\n\r\n");
        let err = parse_request(&mut stream).await.unwrap_err();

        assert!(err.downcast_ref::<UnsupportedMethod>().is_some());
    }

    #[tokio::test]
    async fn closed_connection_yields_none() {
        let mut stream = Cursor::new("");
        assert!(parse_request(&mut stream).await.unwrap().is_none());
    }
}

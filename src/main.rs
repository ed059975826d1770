use std::{env, net::SocketAddr, process::ExitCode};

use clap::Parser;
use tokio::{
    io::{AsyncWrite, BufStream},
    net::{TcpListener, TcpStream},
    signal,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod args;
mod errors;
mod handler;
mod req;
mod resp;
mod templates;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = match args::Args::parse().resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(directory) = &config.directory {
        if let Err(e) = env::set_current_dir(directory) {
            eprintln!("Error: cannot serve from '{}': {e}", directory.display());
            return ExitCode::FAILURE;
        }
    }

    // A failure past this point (port already in use, accept error) is not a
    // usage error: log it and leave through the normal cleanup path.
    if let Err(e) = serve(config.port).await {
        error!("an error occurred: {e:#}");
    }

    ExitCode::SUCCESS
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let handler = handler::StaticFileHandler::in_current_dir()?;

    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    println!(
        "Serving HTTP on port {port} from directory '{}'...",
        handler.root().display()
    );
    info!("listening on: {}", listener.local_addr()?);

    let cancel_token = CancellationToken::new();

    tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if let Ok(()) = signal::ctrl_c().await {
                println!("Keyboard interrupt received, shutting down gracefully...");
                cancel_token.cancel();
            }
        }
    });

    let result = accept_loop(listener, &cancel_token, &handler).await;

    // The listener was dropped inside accept_loop; the port is free again.
    println!("Closing the server.");

    result
}

async fn accept_loop(
    listener: TcpListener,
    cancel_token: &CancellationToken,
    handler: &handler::StaticFileHandler,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            conn = listener.accept() => {
                let (stream, addr) = conn?;
                if let Err(e) = handle_client(cancel_token.clone(), stream, addr, handler).await {
                    error!(?e, "failed to handle client");
                }
            },
            _ = cancel_token.cancelled() => {
                info!("stop listening");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_client(
    cancel_token: CancellationToken,
    stream: TcpStream,
    addr: SocketAddr,
    handler: &handler::StaticFileHandler,
) -> anyhow::Result<()> {
    let mut stream = BufStream::new(stream);

    info!(?addr, "new connection");

    loop {
        tokio::select! {
            req = req::parse_request(&mut stream) => {
                match req {
                    Ok(Some(req)) => {
                        info!(?req, "incoming request");
                        let close_conn = handle_req(req, handler, &mut stream).await?;
                        if close_conn {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        match e.downcast_ref::<req::UnsupportedMethod>() {
                            Some(unsupported) => {
                                info!(%unsupported, "rejecting request");
                                let resp = resp::Response::from_html(
                                    resp::Status::NotImplemented,
                                    templates::unsupported_method_html(&unsupported.0),
                                );
                                resp.write(&mut stream).await?;
                            }
                            None => error!(?e, "failed to parse request"),
                        }
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!(?addr, "closing connection");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_req<S: AsyncWrite + Unpin>(
    req: req::Request,
    handler: &handler::StaticFileHandler,
    stream: &mut S,
) -> anyhow::Result<bool> {
    let close_connection = req.headers.get("Connection") == Some(&"close".to_string());

    match handler.handle(&req).await {
        Ok(resp) if req.method == req::Method::Head => resp.write_head(stream).await?,
        Ok(resp) => resp.write(stream).await?,
        Err(e) => {
            error!(?e, "failed to handle request");
            return Ok(true);
        }
    }

    Ok(close_connection)
}

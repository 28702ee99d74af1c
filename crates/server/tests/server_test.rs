//! End-to-end server tests over real TCP

use std::sync::Arc;

use recon_config::Paths;
use recon_protocol::{read_text_blob, read_u16, write_text_blob, write_u16, MessageId};
use recon_registry::Registry;
use recon_server::{Server, ServerConfig, ServerError};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const CONFIG_XML: &str =
    r#"<configuration><reader class="AcquisitionReader" port="7"/></configuration>"#;

async fn start_server() -> (
    std::net::SocketAddr,
    CancellationToken,
    JoinHandle<Result<(), ServerError>>,
) {
    let config = ServerConfig {
        address: "127.0.0.1".to_owned(),
        port: 0,
    };
    let server = Server::bind(config, Paths::new("/tmp"), Arc::new(Registry::builtin()))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));
    (addr, cancel, handle)
}

async fn expect_eof(client: &mut TcpStream) {
    let mut buf = [0u8; 1];
    // A reset instead of a clean FIN still means the server hung up
    let n = client.read(&mut buf).await.unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_query_session_over_tcp() {
    let (addr, cancel, handle) = start_server().await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    write_u16(&mut client, MessageId::Config.into()).await.unwrap();
    write_text_blob(&mut client, CONFIG_XML).await.unwrap();
    write_u16(&mut client, MessageId::Query.into()).await.unwrap();

    assert_eq!(
        read_u16(&mut client).await.unwrap(),
        u16::from(MessageId::Text)
    );
    assert_eq!(
        read_text_blob(&mut client).await.unwrap(),
        env!("CARGO_PKG_VERSION")
    );

    write_u16(&mut client, MessageId::Close.into()).await.unwrap();
    expect_eof(&mut client).await;

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_failed_connection_does_not_stop_listener() {
    let (addr, cancel, handle) = start_server().await;

    // A misbehaving client sends two CONFIG messages and gets dropped
    let mut bad = TcpStream::connect(addr).await.unwrap();
    for _ in 0..2 {
        write_u16(&mut bad, MessageId::Config.into()).await.unwrap();
        write_text_blob(&mut bad, CONFIG_XML).await.unwrap();
    }
    expect_eof(&mut bad).await;

    // The listener is still serving new clients
    let mut good = TcpStream::connect(addr).await.unwrap();
    write_u16(&mut good, MessageId::Close.into()).await.unwrap();
    expect_eof(&mut good).await;

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

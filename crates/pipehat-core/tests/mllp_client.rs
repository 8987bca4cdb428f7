//! MLLP client against a local listener.

use pipehat_core::mllp::{self, CARRIAGE_RETURN, END_OF_BLOCK, MllpClient, SendOptions};
use pipehat_core::{Message, PipehatError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[tokio::test]
async fn sends_frame_and_returns_unframed_ack() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            if received
                .windows(2)
                .any(|w| w == [END_OF_BLOCK, CARRIAGE_RETURN])
            {
                break;
            }
        }
        let ack = "MSH|^~\\&|C|D|A|B|1||ACK|MSG1|P|2.3\rMSA|AA|MSG1\r";
        socket.write_all(&mllp::frame(ack)).await.unwrap();
        mllp::unframe(&received).unwrap()
    });

    let client = MllpClient::new("127.0.0.1", port, SendOptions::default());
    let message = "MSH|^~\\&|A|B|C|D|1||ADT^A01|MSG1|P|2.3\r";
    let ack = client.send(message).await.unwrap();

    let parsed = Message::parse(&ack).unwrap();
    assert_eq!(parsed.query("MSA-1").unwrap(), vec!["AA"]);
    assert_eq!(server.await.unwrap(), message);
}

#[tokio::test]
async fn unframed_reply_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut chunk = [0u8; 256];
        let _ = socket.read(&mut chunk).await;
        socket.write_all(b"plain text, no markers").await.unwrap();
        // close without the end-of-block pair
    });

    let client = MllpClient::new("127.0.0.1", port, SendOptions::default());
    let err = client.send("MSH|^~\\&|A\r").await.unwrap_err();
    assert!(matches!(err, PipehatError::Transport { .. }));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // Bind then drop to obtain a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = MllpClient::new("127.0.0.1", port, SendOptions::default());
    let err = client.send("MSH|^~\\&|A\r").await.unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, PipehatError::Transport { .. }));
}

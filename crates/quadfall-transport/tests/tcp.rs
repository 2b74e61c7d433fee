//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on `127.0.0.1:0` and talk to it with a
//! plain `TcpStream`, so bytes actually cross the loopback interface.

use quadfall_protocol::{FRAME_HEADER_LEN, Value, deserialize, frame_len, pack};
use quadfall_transport::{TcpTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn bind() -> (TcpTransport, std::net::SocketAddr) {
    let transport = TcpTransport::bind("127.0.0.1:0").await.expect("should bind");
    let addr = transport.local_addr().expect("should have address");
    (transport, addr)
}

async fn read_client_frame(stream: &mut TcpStream) -> Value {
    let mut header = [0u8; FRAME_HEADER_LEN];
    stream.read_exact(&mut header).await.unwrap();
    let mut body = vec![0u8; frame_len(header)];
    stream.read_exact(&mut body).await.unwrap();
    deserialize(&body).unwrap()
}

#[tokio::test]
async fn test_accept_assigns_sequential_ids_from_one() {
    let (mut transport, addr) = bind().await;

    let _a = TcpStream::connect(addr).await.unwrap();
    let first = transport.accept().await.unwrap();
    let _b = TcpStream::connect(addr).await.unwrap();
    let second = transport.accept().await.unwrap();

    assert_eq!(first.id().into_inner(), 1);
    assert_eq!(second.id().into_inner(), 2);
}

#[tokio::test]
async fn test_frames_flow_both_ways() {
    let (mut transport, addr) = bind().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    let conn = transport.accept().await.unwrap();
    let (mut reader, peer) = conn.split(1024);

    let hello: Value = [("type", Value::from("connect"))].into_iter().collect();
    client.write_all(&pack(&hello).unwrap()).await.unwrap();

    let body = reader.read_frame().await.unwrap().expect("a frame");
    assert_eq!(deserialize(&body).unwrap(), hello);

    let reply: Value = [("status", Value::from("ok"))].into_iter().collect();
    peer.send(pack(&reply).unwrap()).unwrap();
    assert_eq!(read_client_frame(&mut client).await, reply);
}

#[tokio::test]
async fn test_frame_split_across_writes_is_reassembled() {
    let (mut transport, addr) = bind().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    let (mut reader, _peer) = transport.accept().await.unwrap().split(1024);

    let msg = Value::from("split me");
    let mut head = pack(&msg).unwrap();
    let tail = head.split_off(3);

    let writer = tokio::spawn(async move {
        client.write_all(&head).await.unwrap();
        client.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        client.write_all(&tail).await.unwrap();
        client
    });

    let body = reader.read_frame().await.unwrap().unwrap();
    assert_eq!(deserialize(&body).unwrap(), msg);
    drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_client_close_reads_as_none() {
    let (mut transport, addr) = bind().await;
    let client = TcpStream::connect(addr).await.unwrap();
    let (mut reader, _peer) = transport.accept().await.unwrap().split(1024);

    drop(client);
    assert!(reader.read_frame().await.unwrap().is_none());
}

#[tokio::test]
async fn test_oversized_header_is_rejected() {
    let (mut transport, addr) = bind().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    let (mut reader, _peer) = transport.accept().await.unwrap().split(64);

    client.write_all(&1_000_000u32.to_be_bytes()).await.unwrap();

    let err = reader.read_frame().await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::FrameTooLarge {
            len: 1_000_000,
            max: 64
        }
    ));
}

#[tokio::test]
async fn test_bind_to_taken_port_fails() {
    let (_transport, addr) = bind().await;
    let err = TcpTransport::bind(addr).await.err().expect("port is taken");
    assert!(matches!(err, TransportError::BindFailed(_)));
}

//! Command/response cycles against a loopback TCP device

use avlink_core::{
    CommandClient, ConnectionState, DeviceEndpoint, LinkError, OutgoingCommand, Termination,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn endpoint(port: u16) -> DeviceEndpoint {
    DeviceEndpoint::new("127.0.0.1", port)
        .send_delay_ms(10)
        .receive_wait_ms(50)
        .receive_timeout_ms(200)
        .connect_timeout_ms(1000)
}

/// Read until the device sees a carriage return
async fn read_command(stream: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 64];
    while !received.ends_with(b"\r") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    received
}

#[tokio::test]
async fn query_gets_short_reply() {
    let (listener, port) = listener().await;
    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let command = read_command(&mut stream).await;
        stream.write_all(b"!1PWR01\r\n").await.unwrap();
        // hold the link open until the client hangs up
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
        command
    });

    let mut client = CommandClient::new(endpoint(port));
    let response = client.send_text("!1PWRQSTN\r").await;

    assert!(response.is_ok());
    assert_eq!(response.text(), "!1PWR01\r\n");
    assert_eq!(response.termination(), Termination::ShortRead);
    assert_eq!(client.connection().state(), ConnectionState::Connected);

    assert!(client.disconnect().await);
    assert_eq!(device.await.unwrap(), b"!1PWRQSTN\r");
}

#[tokio::test]
async fn reply_larger_than_buffer_is_collected() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_command(&mut stream).await;
        stream.write_all(b"ABCDEFGHIJ").await.unwrap();
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });

    let mut client = CommandClient::new(endpoint(port)).with_chunk_size(4);
    let response = client.send_text("!1NLSQSTN\r").await;

    assert!(response.is_ok());
    assert_eq!(response.text(), "ABCDEFGHIJ");
    assert!(response.packets() >= 3);
    client.disconnect().await;
}

#[tokio::test]
async fn silent_device_yields_empty_response() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });

    let mut client = CommandClient::new(endpoint(port));
    let response = client.send_text("!1MVLUP\r").await;

    assert!(response.is_ok());
    assert!(response.is_empty());
    assert_eq!(response.termination(), Termination::TimedOut);
    assert!(client.connection().is_connected());
    client.disconnect().await;
}

#[tokio::test]
async fn repeated_command_reaches_device_each_time() {
    let (listener, port) = listener().await;
    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 64];
        while received.len() < 3 * b"!1MVLUP\r".len() {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        stream.write_all(b"!1MVL2A\r\n").await.unwrap();
        let _ = stream.read_to_end(&mut Vec::new()).await;
        received
    });

    let mut client = CommandClient::new(endpoint(port));
    let command = OutgoingCommand::from_text("!1MVLUP\r").repeat(3).delay_ms(20);
    let response = client.send(&command).await;

    assert_eq!(response.text(), "!1MVL2A\r\n");
    assert_eq!(client.connection().stats().writes, 3);
    client.disconnect().await;
    assert_eq!(device.await.unwrap(), b"!1MVLUP\r!1MVLUP\r!1MVLUP\r");
}

#[tokio::test]
async fn reconnects_after_device_hangs_up() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        for (i, reply) in [b"A", b"B"].into_iter().enumerate() {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_command(&mut stream).await;
            stream.write_all(reply).await.unwrap();
            if i == 1 {
                let _ = stream.read_to_end(&mut Vec::new()).await;
            }
        }
    });

    let mut client = CommandClient::new(endpoint(port));
    assert_eq!(client.send_text("Q1\r").await.text(), "A");

    // the device has closed its end; the next exchange notices
    let _ = client.send_text("Q2\r").await;
    assert!(!client.connection().is_connected());

    let response = client.send_text("Q3\r").await;
    assert_eq!(response.text(), "B");
    assert_eq!(client.connection().stats().connect_attempts, 2);
    client.disconnect().await;
}

#[tokio::test]
async fn refused_connection_reports_connect_failure() {
    let (listener, port) = listener().await;
    drop(listener);

    let mut client = CommandClient::new(endpoint(port));
    let response = client.send_text("!1PWR01\r").await;

    assert!(response.is_empty());
    assert_eq!(response.termination(), Termination::NotConnected);
    assert!(matches!(response.error(), Some(LinkError::ConnectFailed(_))));
    assert!(!client.connection().is_connected());
}

#[tokio::test]
async fn probe_reports_reachability() {
    let (listener, port) = listener().await;
    let accept = tokio::spawn(async move {
        let _ = listener.accept().await;
    });

    let mut client = CommandClient::new(endpoint(port));
    assert!(client.connection_mut().probe().await);
    assert!(!client.connection().is_connected());
    accept.await.unwrap();

    // listener is gone once the accept task finished
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!client.connection_mut().probe().await);
}

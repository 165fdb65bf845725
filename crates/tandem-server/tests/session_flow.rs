//! End-to-end session flow over a loopback TCP connection.

use std::{net::SocketAddr, time::Duration};

use tandem_server::{Server, ServerRuntimeConfig};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    time::timeout,
};

async fn start_server() -> SocketAddr {
    let config = ServerRuntimeConfig {
        bind_address: "127.0.0.1:0".to_string(),
        admin_token: Some("sesame".to_string()),
        ..ServerRuntimeConfig::default()
    };

    let server = Server::bind(config).await.expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, writer) = stream.into_split();
        let mut client = Self { lines: BufReader::new(reader).lines(), writer };

        // Drain the two-line welcome banner
        client.recv().await;
        client.recv().await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.expect("write");
        self.writer.write_all(b"\n").await.expect("write newline");
    }

    async fn recv(&mut self) -> String {
        timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read error")
            .expect("connection closed")
    }
}

#[tokio::test]
async fn match_relay_and_end_flow() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.send("/start").await;
    assert_eq!(alice.recv().await, "* waiting for a partner...");

    bob.send("/start").await;
    assert_eq!(bob.recv().await, "* matched! you are now chatting, say hi");
    assert_eq!(alice.recv().await, "* matched! you are now chatting, say hi");

    // Plain text is relayed verbatim
    alice.send("hello").await;
    assert_eq!(bob.recv().await, "hello");

    // A link is blocked: sender informed, partner sees nothing. The next
    // clean message arriving first on bob's side proves the block.
    alice.send("check out http://x.com").await;
    assert_eq!(alice.recv().await, "* message blocked: plain text without links only");
    alice.send("no links then").await;
    assert_eq!(bob.recv().await, "no links then");

    bob.send("/end").await;
    assert_eq!(bob.recv().await, "* chat ended, use /start to match again");
    assert_eq!(alice.recv().await, "* your partner ended the chat");
}

#[tokio::test]
async fn admin_stats_and_broadcast() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.send("/start").await;
    alice.recv().await;
    bob.send("/start").await;
    bob.recv().await;
    alice.recv().await;
    bob.send("/end").await;
    bob.recv().await;
    alice.recv().await;

    // Admin commands are refused before authentication
    let mut admin = TestClient::connect(addr).await;
    admin.send("/stats").await;
    assert_eq!(admin.recv().await, "* not authorized");
    admin.send("/admin wrong-token").await;
    assert_eq!(admin.recv().await, "* not authorized");

    admin.send("/admin sesame").await;
    assert_eq!(admin.recv().await, "* admin access granted");

    // Two participants ever observed, none active or waiting anymore
    admin.send("/stats").await;
    assert_eq!(admin.recv().await, "* users=2 active_pairs=0 waiting=0");

    // Broadcast reaches every known participant and reports counts
    admin.send("/broadcast maintenance at noon").await;
    assert_eq!(alice.recv().await, "* announcement: maintenance at noon");
    assert_eq!(bob.recv().await, "* announcement: maintenance at noon");
    assert_eq!(admin.recv().await, "* broadcast delivered=2 failed=0");
}

#[tokio::test]
async fn disconnect_notifies_partner() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.send("/start").await;
    alice.recv().await;
    bob.send("/start").await;
    bob.recv().await;
    alice.recv().await;

    // Alice's connection drops without an explicit /end
    drop(alice);

    assert_eq!(bob.recv().await, "* your partner ended the chat");
}

#[tokio::test]
async fn unknown_command_gets_a_hint() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    alice.send("/frobnicate").await;
    assert_eq!(alice.recv().await, "* unknown command /frobnicate, try /help");
}

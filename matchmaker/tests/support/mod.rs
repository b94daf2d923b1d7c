// Boots one shared matchmaker for the whole integration binary.

use std::net::TcpStream;
use std::sync::{mpsc, OnceLock};
use std::time::Duration;

static BASE_URL: OnceLock<String> = OnceLock::new();

// Start the matchmaker once on an ephemeral port and return its base URL.
pub fn ensure_server() -> &'static str {
    BASE_URL
        .get_or_init(|| {
            // Knobs for a fast suite: quick ticks, a short dispatch
            // deadline, and a heartbeat timeout that never fires here.
            std::env::set_var("MATCH_TICK_MS", "100");
            std::env::set_var("DISPATCH_TIMEOUT_SECS", "2");
            std::env::set_var("HEARTBEAT_TIMEOUT_SECS", "600");

            let (addr_tx, addr_rx) = mpsc::channel();

            // A dedicated OS thread with its own runtime outlives every
            // per-test tokio runtime in this binary.
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Runtime::new().expect("test runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                        .await
                        .expect("bind ephemeral test port");
                    let addr = listener.local_addr().expect("local addr");
                    addr_tx.send(addr).expect("publish test addr");
                    matchmaker::run(listener).await.expect("matchmaker exited");
                });
            });

            let addr = addr_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("matchmaker never bound");

            // Wait until the socket actually accepts connections.
            for _ in 0..100 {
                if TcpStream::connect(addr).is_ok() {
                    return format!("http://{addr}");
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            panic!("matchmaker did not become ready in time");
        })
        .as_str()
}

#![allow(dead_code)]

pub mod db {
    use pet_lookup::config::DatabaseConfig;
    use pet_lookup::store::SqlitePetStore;
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub const SCHEMA: &str = "
        CREATE TABLE Owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
        CREATE TABLE Pet (id INTEGER PRIMARY KEY, name TEXT NOT NULL, species TEXT,
                          ownerId INTEGER REFERENCES Owner(id));";

    pub const SEED: &str = "
        INSERT INTO Owner (id, name, email) VALUES (7, 'Alice', 'alice@example.com');
        INSERT INTO Owner (id, name, email) VALUES (8, 'Bob', NULL);
        INSERT INTO Pet (id, name, species, ownerId) VALUES (1, 'Rex', 'dog', 7);
        INSERT INTO Pet (id, name, species, ownerId) VALUES (2, 'Stray', NULL, NULL);
        INSERT INTO Pet (id, name, species, ownerId) VALUES (3, 'Tom', 'cat', 8);";

    /// A seeded SQLite file that lives as long as the returned directory.
    pub struct SeededDb {
        _dir: TempDir,
        pub path: PathBuf,
    }

    impl SeededDb {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("pets.db");
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(SCHEMA).unwrap();
            conn.execute_batch(SEED).unwrap();
            drop(conn);
            Self { _dir: dir, path }
        }

        pub fn config(&self) -> DatabaseConfig {
            DatabaseConfig {
                path: self.path.clone(),
                busy_timeout_ms: 1_000,
                read_only: true,
            }
        }

        pub fn open_store(&self) -> SqlitePetStore {
            SqlitePetStore::open(&self.config()).unwrap()
        }
    }
}

pub mod test_server {
    use super::tracing_util::TestTracing;
    use pet_lookup::app::build_service;
    use pet_lookup::runtime_config::RuntimeConfig;
    use pet_lookup::server::{HttpServer, ServerHandle};
    use pet_lookup::store::PetRepository;
    use std::net::{SocketAddr, TcpListener};
    use std::sync::Arc;

    /// Running server on an ephemeral port, stopped on drop.
    pub struct TestServer {
        _tracing: TestTracing,
        handle: Option<ServerHandle>,
        addr: SocketAddr,
    }

    impl TestServer {
        pub fn start(store: Arc<dyn PetRepository>, metrics: bool) -> Self {
            let tracing = TestTracing::init();
            let runtime = RuntimeConfig {
                stack_size: 0x10000,
            };
            let service = build_service(store, &runtime, metrics).unwrap();

            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();

            Self {
                _tracing: tracing,
                handle: Some(handle),
                addr,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Send a raw request and read one response, honouring `Content-Length`.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(1_000)))
            .unwrap();

        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&tmp[..n]);
                    if response_complete(&buf) {
                        break;
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn response_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = head.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        });
        match content_length {
            Some(len) => body.len() >= len,
            None => false,
        }
    }

    pub fn get(addr: &SocketAddr, path: &str) -> String {
        send_request(
            addr,
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        )
    }

    /// Status line code, header block and body.
    pub fn parse_response_parts(resp: &str) -> (u16, String, String) {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap_or(0);
        (status, head.to_string(), body.to_string())
    }

    pub fn parse_response(resp: &str) -> (u16, serde_json::Value) {
        let (status, _, body) = parse_response_parts(resp);
        let json = serde_json::from_str(&body).unwrap_or_default();
        (status, json)
    }

    pub fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then_some(v.trim())
        })
    }
}

pub mod tracing_util {
    /// Routes `tracing` output through the test harness writer for the
    /// lifetime of the guard.
    pub struct TestTracing {
        _guard: tracing::subscriber::DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
                )
                .with_test_writer()
                .finish();
            Self {
                _guard: tracing::subscriber::set_default(subscriber),
            }
        }
    }
}

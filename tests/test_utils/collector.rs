//! A local HTTP collector that records request bodies.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// Body and headers of one received request.
pub struct Received {
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl Received {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn read_request(stream: &TcpStream) -> Received {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    reader.read_line(&mut line).expect("request line");

    let mut headers = Vec::new();
    let mut length = 0;
    loop {
        line.clear();
        reader.read_line(&mut line).expect("header line");
        let Some((key, value)) = line.trim().split_once(':') else {
            break;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim().to_owned();
        if key == "content-length" {
            length = value.parse().expect("numeric content-length");
        }
        headers.push((key, value));
    }

    let mut body = vec![0; length];
    reader.read_exact(&mut body).expect("request body");
    Received {
        headers,
        body: serde_json::from_slice(&body).expect("JSON body"),
    }
}

/// Answer `count` requests with `status` and `reply`, forwarding each one.
pub fn spawn_collector(
    count: usize,
    status: u16,
    reply: &str,
) -> (SocketAddr, mpsc::Receiver<Received>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind collector");
    let addr = listener.local_addr().expect("collector address");
    let (tx, rx) = mpsc::channel();
    let reply = reply.to_owned();

    thread::spawn(move || {
        for _ in 0..count {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let received = read_request(&stream);
            let response = format!(
                "HTTP/1.1 {status} Collected\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(received);
        }
    });

    (addr, rx)
}

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How the fake server answers a connection.
#[derive(Clone, Copy)]
pub enum Behaviour {
    /// Speaks enough RESP for a probe: `PING`, `QUIT` and `+OK` for anything else.
    Redis,
    /// Replies to `PING` with something other than `PONG`.
    WrongPong,
    /// Accepts and immediately hangs up.
    HangUp,
}

#[derive(Default)]
pub struct Counters {
    pub connections: AtomicUsize,
    pub pings: AtomicUsize,
    pub quits: AtomicUsize,
    /// Connections the client hung up on without `QUIT`.
    pub closed: AtomicUsize,
}

impl Counters {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Polls `read` until it reaches `expected` or a second has passed.
    pub fn wait_for(&self, read: impl Fn(&Self) -> usize, expected: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(1);
        while read(self) < expected && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        read(self)
    }
}

pub struct FakeRedis {
    pub port: u16,
    pub counters: Arc<Counters>,
}

pub fn spawn(behaviour: Behaviour) -> FakeRedis {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let counters = Arc::new(Counters::default());

    let shared = Arc::clone(&counters);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            shared.connections.fetch_add(1, Ordering::SeqCst);
            let counters = Arc::clone(&shared);
            thread::spawn(move || serve(stream, behaviour, &counters));
        }
    });

    FakeRedis { port, counters }
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn serve(stream: TcpStream, behaviour: Behaviour, counters: &Counters) {
    if let Behaviour::HangUp = behaviour {
        return;
    }
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);

    while let Some(command) = read_command(&mut reader) {
        let reply: &[u8] = match command.to_ascii_uppercase().as_str() {
            "PING" => {
                counters.pings.fetch_add(1, Ordering::SeqCst);
                match behaviour {
                    Behaviour::WrongPong => b"+NOPE\r\n",
                    _ => b"+PONG\r\n",
                }
            }
            "QUIT" => {
                counters.quits.fetch_add(1, Ordering::SeqCst);
                let _ = writer.write_all(b"+OK\r\n");
                return;
            }
            _ => b"+OK\r\n",
        };
        if writer.write_all(reply).is_err() {
            return;
        }
    }
    counters.closed.fetch_add(1, Ordering::SeqCst);
}

/// Reads one RESP array and returns its first element.
fn read_command(reader: &mut BufReader<TcpStream>) -> Option<String> {
    let count: usize = read_line(reader)?.strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let len: usize = read_line(reader)?.strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    args.into_iter().next()
}

fn read_line(reader: &mut BufReader<TcpStream>) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end().to_string()),
    }
}

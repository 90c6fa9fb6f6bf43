// src/transport/rcon.rs
//! Source RCON over TCP.
//!
//! Every packet is `size | id | type | body \0 | \0`, all integers little
//! endian, where `size` counts everything after itself. Replies longer than
//! one packet are split by the server, so after the command we send an empty
//! `SERVERDATA_RESPONSE_VALUE` and collect bodies until its id comes back.

use std::io::{Cursor, Read};
use std::time::Duration;
use async_trait::async_trait;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use super::{RemoteExec, TransportError};

pub const SERVERDATA_AUTH: i32 = 3;
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

const AUTH_FAILED_ID: i32 = -1;
const MIN_PACKET_SIZE: i32 = 10;
const MAX_PACKET_SIZE: i32 = 65536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    pub fn new(id: i32, kind: i32, body: &str) -> Self {
        Self { id, kind, body: body.to_string() }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = self.body.as_bytes();
        let size = (body.len() + MIN_PACKET_SIZE as usize) as i32;
        let mut buf = Vec::with_capacity(size as usize + 4);
        // writes into a Vec cannot fail
        let _ = WriteBytesExt::write_i32::<LittleEndian>(&mut buf, size);
        let _ = WriteBytesExt::write_i32::<LittleEndian>(&mut buf, self.id);
        let _ = WriteBytesExt::write_i32::<LittleEndian>(&mut buf, self.kind);
        buf.extend_from_slice(body);
        buf.extend_from_slice(&[0, 0]);
        buf
    }

    /// Decodes the bytes following the size prefix.
    pub fn decode(payload: &[u8]) -> Result<Self, TransportError> {
        let mut cursor = Cursor::new(payload);
        let id = ReadBytesExt::read_i32::<LittleEndian>(&mut cursor)?;
        let kind = ReadBytesExt::read_i32::<LittleEndian>(&mut cursor)?;
        let mut rest = Vec::new();
        Read::read_to_end(&mut cursor, &mut rest)?;

        if !rest.ends_with(&[0, 0]) {
            return Err(TransportError::Protocol("missing body terminator".to_string()));
        }
        rest.truncate(rest.len() - 2);
        Ok(Self { id, kind, body: String::from_utf8_lossy(&rest).into_owned() })
    }
}

pub async fn read_packet(stream: &mut TcpStream) -> Result<Packet, TransportError> {
    let size = stream.read_i32_le().await?;
    if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&size) {
        return Err(TransportError::Protocol(format!("invalid packet size {}", size)));
    }
    let mut payload = vec![0u8; size as usize];
    stream.read_exact(&mut payload).await?;
    Packet::decode(&payload)
}

pub async fn write_packet(stream: &mut TcpStream, packet: &Packet) -> Result<(), TransportError> {
    stream.write_all(&packet.encode()).await?;
    Ok(())
}

/// Opens a fresh authenticated session for every command.
pub struct RconClient {
    address: String,
    password: String,
    timeout: Duration,
}

impl RconClient {
    pub fn new(address: String, password: String, timeout: Duration) -> Self {
        Self { address, password, timeout }
    }

    async fn session(&self, command: &str) -> Result<String, TransportError> {
        let mut stream = TcpStream::connect(&self.address).await?;
        let (auth_id, command_id, sentinel_id) = packet_ids();

        write_packet(&mut stream, &Packet::new(auth_id, SERVERDATA_AUTH, &self.password)).await?;
        loop {
            let packet = read_packet(&mut stream).await?;
            if packet.kind != SERVERDATA_AUTH_RESPONSE {
                continue;
            }
            if packet.id == AUTH_FAILED_ID {
                return Err(TransportError::AuthRejected);
            }
            if packet.id == auth_id {
                break;
            }
            warn!("Ignoring auth response with unexpected id {}", packet.id);
        }
        debug!("Authenticated to RCON at {}", self.address);

        write_packet(&mut stream, &Packet::new(command_id, SERVERDATA_EXECCOMMAND, command)).await?;
        write_packet(&mut stream, &Packet::new(sentinel_id, SERVERDATA_RESPONSE_VALUE, "")).await?;

        let mut reply = String::new();
        loop {
            let packet = read_packet(&mut stream).await?;
            if packet.id == sentinel_id {
                break;
            }
            if packet.id == command_id && packet.kind == SERVERDATA_RESPONSE_VALUE {
                reply.push_str(&packet.body);
            }
        }
        debug!("RCON reply for {:?} was {} bytes", command, reply.len());
        Ok(reply)
    }
}

#[async_trait]
impl RemoteExec for RconClient {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        match tokio::time::timeout(self.timeout, self.session(command)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

fn packet_ids() -> (i32, i32, i32) {
    let mut rng = rand::thread_rng();
    let base: i32 = rng.gen_range(1..i32::MAX - 3);
    (base, base + 1, base + 2)
}

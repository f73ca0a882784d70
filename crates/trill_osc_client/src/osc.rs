/*
    trill_invoke Copyright 2025 The trill_invoke contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

//! OSC 1.0 encoding and decoding, restricted to what a trill-osc device speaks.
//!
//! A packet is either a message or a bundle:
//!
//! ```text
//! message: <address: osc-string> <type tags: osc-string ",fsb..."> <arg>*
//! bundle:  "#bundle\0" <timetag: u64 BE> (<size: i32 BE> <packet>)*
//! ```
//!
//! osc-strings are NUL terminated and padded with NULs to a multiple of 4 bytes. `f` and `i`
//! arguments are 32 bit big-endian; `b` (blob) is an i32 length followed by the padded data.

use std::{error::Error, fmt::Display, str};

pub const COMMAND_PREFIX: &str = "/trill/command/";
pub const READINGS_PREFIX: &str = "/trill/readings";
pub const COMMAND_REPLY_ADDRESS: &str = "/trill/commandreply";

pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";
/// The OSC timetag meaning "immediately".
pub const TIMETAG_IMMEDIATE: u64 = 1;
/// Bundles nested deeper than this are rejected.
pub const MAX_BUNDLE_DEPTH: usize = 8;

/// [OscType] is a single typed OSC argument.
#[derive(Clone, Debug, PartialEq)]
pub enum OscType {
    Float(f32),
    Int(i32),
    String(String),
    Blob(Vec<u8>),
}

impl OscType {
    /// Returns the type tag character used on the wire for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            OscType::Float(_) => 'f',
            OscType::Int(_) => 'i',
            OscType::String(_) => 's',
            OscType::Blob(_) => 'b',
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            OscType::Float(_) => "float",
            OscType::Int(_) => "integer",
            OscType::String(_) => "string",
            OscType::Blob(_) => "blob",
        }
    }

    /// Returns whether this argument may be sent as part of a command. Commands carry floats
    /// and strings only.
    pub fn is_command_arg(&self) -> bool {
        matches!(self, OscType::Float(_) | OscType::String(_))
    }
}

impl From<f32> for OscType {
    fn from(value: f32) -> Self {
        OscType::Float(value)
    }
}

impl From<i32> for OscType {
    fn from(value: i32) -> Self {
        OscType::Int(value)
    }
}

impl From<&str> for OscType {
    fn from(value: &str) -> Self {
        OscType::String(value.to_string())
    }
}

impl From<String> for OscType {
    fn from(value: String) -> Self {
        OscType::String(value)
    }
}

impl From<Vec<u8>> for OscType {
    fn from(value: Vec<u8>) -> Self {
        OscType::Blob(value)
    }
}

/// An [OscMessage] is an address plus its ordered arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscType>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscType>) -> Self {
        OscMessage {
            address: address.into(),
            args,
        }
    }

    /// Number of `/`-delimited segments in the address, counting the empty one before a
    /// leading slash. `"/trill"` has two, `"trill"` has one.
    pub fn segment_count(&self) -> usize {
        self.address.split('/').count()
    }

    /// A message needs at least two address segments to be worth handling.
    pub fn is_well_formed(&self) -> bool {
        self.segment_count() >= 2
    }

    pub fn is_reading(&self) -> bool {
        self.address.starts_with(READINGS_PREFIX)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OscBundle {
    pub timetag: u64,
    pub content: Vec<OscPacket>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

/// [OscError] represents the ways an incoming payload can fail to decode.
#[derive(Clone, Debug, PartialEq)]
pub enum OscError {
    Empty,
    Truncated,
    UnterminatedString,
    InvalidUtf8,
    BadTypeTags,
    UnknownTypeTag(char),
    BadSize(i32),
    BundleTooDeep,
}

impl Error for OscError {}
impl Display for OscError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            OscError::Empty => write!(f, "Empty packet."),
            OscError::Truncated => write!(f, "Packet ended unexpectedly."),
            OscError::UnterminatedString => write!(f, "String is missing its NUL terminator."),
            OscError::InvalidUtf8 => write!(f, "String is not valid UTF-8."),
            OscError::BadTypeTags => write!(f, "Type tag string does not start with ','."),
            OscError::UnknownTypeTag(c) => write!(f, "Unsupported type tag '{}'.", c),
            OscError::BadSize(size) => write!(f, "Invalid size field: {}.", size),
            OscError::BundleTooDeep => {
                write!(f, "Bundles nested deeper than {} levels.", MAX_BUNDLE_DEPTH)
            }
        }
    }
}

#[inline]
fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    // At least one NUL, then pad to a 4 byte boundary.
    let padded = pad4(s.len() + 1);
    out.resize(out.len() + (padded - s.len()), 0);
}

fn write_blob(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as i32).to_be_bytes());
    out.extend_from_slice(data);
    out.resize(out.len() + (pad4(data.len()) - data.len()), 0);
}

pub fn encode_message(msg: &OscMessage) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    write_string(&mut out, &msg.address);

    let mut tags = String::with_capacity(msg.args.len() + 1);
    tags.push(',');
    tags.extend(msg.args.iter().map(OscType::type_tag));
    write_string(&mut out, &tags);

    for arg in &msg.args {
        match arg {
            OscType::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
            OscType::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            OscType::String(s) => write_string(&mut out, s),
            OscType::Blob(b) => write_blob(&mut out, b),
        }
    }
    out
}

pub fn encode_packet(packet: &OscPacket) -> Vec<u8> {
    match packet {
        OscPacket::Message(msg) => encode_message(msg),
        OscPacket::Bundle(bundle) => {
            let mut out = Vec::with_capacity(64);
            out.extend_from_slice(BUNDLE_TAG);
            out.extend_from_slice(&bundle.timetag.to_be_bytes());
            for element in &bundle.content {
                let bytes = encode_packet(element);
                out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                out.extend_from_slice(&bytes);
            }
            out
        }
    }
}

/// Build the message for command `name`. The address is [COMMAND_PREFIX] followed by the name.
/// Only float and string arguments are carried; anything else is dropped with a warning and the
/// remaining arguments are kept in order.
pub fn command_message(name: &str, args: &[OscType]) -> OscMessage {
    let mut kept = Vec::with_capacity(args.len());
    for (n, arg) in args.iter().enumerate() {
        if arg.is_command_arg() {
            kept.push(arg.clone());
        } else {
            log::warn!(
                "Unsupported argument type {} at position {} of command {}, skipping",
                arg.type_name(),
                n,
                name
            );
        }
    }
    OscMessage::new(format!("{}{}", COMMAND_PREFIX, name), kept)
}

pub fn encode_command(name: &str, args: &[OscType]) -> Vec<u8> {
    encode_message(&command_message(name, args))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], OscError> {
        if len > self.remaining() {
            return Err(OscError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, OscError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, OscError> {
        Ok(self.read_u32()? as i32)
    }

    fn read_f32(&mut self) -> Result<f32, OscError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    fn read_u64(&mut self) -> Result<u64, OscError> {
        let hi = self.read_u32()? as u64;
        let lo = self.read_u32()? as u64;
        Ok(hi << 32 | lo)
    }

    fn read_size(&mut self) -> Result<usize, OscError> {
        let size = self.read_i32()?;
        if size < 0 {
            return Err(OscError::BadSize(size));
        }
        Ok(size as usize)
    }

    fn read_string(&mut self) -> Result<&'a str, OscError> {
        let rest = &self.buf[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(OscError::UnterminatedString)?;
        let bytes = self.take(pad4(nul + 1))?;
        str::from_utf8(&bytes[..nul]).map_err(|_| OscError::InvalidUtf8)
    }

    fn read_blob(&mut self) -> Result<Vec<u8>, OscError> {
        let len = self.read_size()?;
        let bytes = self.take(pad4(len))?;
        Ok(bytes[..len].to_vec())
    }
}

fn decode_message(buf: &[u8]) -> Result<OscMessage, OscError> {
    let mut reader = Reader::new(buf);
    let address = reader.read_string()?.to_string();

    // Very old senders omit the type tag string entirely; treat that as no arguments.
    if reader.remaining() == 0 {
        return Ok(OscMessage::new(address, Vec::new()));
    }

    let tags = reader.read_string()?;
    let mut tag_chars = tags.chars();
    if tag_chars.next() != Some(',') {
        return Err(OscError::BadTypeTags);
    }

    let mut args = Vec::with_capacity(tags.len() - 1);
    for tag in tag_chars {
        let arg = match tag {
            'f' => OscType::Float(reader.read_f32()?),
            'i' => OscType::Int(reader.read_i32()?),
            's' => OscType::String(reader.read_string()?.to_string()),
            'b' => OscType::Blob(reader.read_blob()?),
            _ => return Err(OscError::UnknownTypeTag(tag)),
        };
        args.push(arg);
    }
    Ok(OscMessage::new(address, args))
}

fn decode_bundle(buf: &[u8], depth: usize) -> Result<OscBundle, OscError> {
    let mut reader = Reader::new(buf);
    reader.take(BUNDLE_TAG.len())?;
    let timetag = reader.read_u64()?;

    let mut content = Vec::new();
    while reader.remaining() > 0 {
        let size = reader.read_size()?;
        let element = reader.take(size)?;
        content.push(decode_at_depth(element, depth + 1)?);
    }
    Ok(OscBundle { timetag, content })
}

fn decode_at_depth(buf: &[u8], depth: usize) -> Result<OscPacket, OscError> {
    if buf.is_empty() {
        return Err(OscError::Empty);
    }
    if buf.starts_with(BUNDLE_TAG) {
        if depth >= MAX_BUNDLE_DEPTH {
            return Err(OscError::BundleTooDeep);
        }
        Ok(OscPacket::Bundle(decode_bundle(buf, depth)?))
    } else {
        Ok(OscPacket::Message(decode_message(buf)?))
    }
}

/// Decode one received datagram.
pub fn decode(buf: &[u8]) -> Result<OscPacket, OscError> {
    decode_at_depth(buf, 0)
}

/// Unpack a packet into its messages in the order they were encountered. Nested bundles are
/// unpacked depth first.
pub fn flatten(packet: OscPacket) -> Vec<OscMessage> {
    let mut messages = Vec::new();
    flatten_into(packet, &mut messages);
    messages
}

fn flatten_into(packet: OscPacket, messages: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => messages.push(msg),
        OscPacket::Bundle(bundle) => {
            for element in bundle.content {
                flatten_into(element, messages);
            }
        }
    }
}

/// Interpret a blob as packed little-endian f32 values. A trailing partial value is dropped.
pub fn blob_to_floats(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

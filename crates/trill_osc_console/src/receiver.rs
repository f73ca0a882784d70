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

//! The receive path: datagram -> packet -> messages -> printer.

use std::io::{self, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use trill_osc_client::osc::{self, OscMessage};
use trill_osc_client::{ClientError, OscSocket, MAX_DATAGRAM_SIZE};

use crate::printer::{PrinterConfig, ReadingPrinter};

/// Pause after a receive error so a persistent failure doesn't spin the thread.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Hand one message to the printer, unless its address is malformed. Returns whether the
/// message was printed.
pub fn route_message<W: Write>(msg: &OscMessage, printer: &mut ReadingPrinter<W>) -> bool {
    if !msg.is_well_formed() {
        log::warn!("bad OSC address: {:?}", msg.address);
        return false;
    }

    match printer.print(msg) {
        Ok(printed) => printed,
        Err(e) => {
            log::error!("Failed to print message {}: {}", msg.address, e);
            false
        }
    }
}

/// Decode one datagram and route every message it contains, in order. Returns the number of
/// messages printed.
pub fn handle_datagram<W: Write>(bytes: &[u8], printer: &mut ReadingPrinter<W>) -> usize {
    let packet = match osc::decode(bytes) {
        Ok(packet) => packet,
        Err(e) => {
            log::warn!("Dropping undecodable datagram ({} bytes): {}", bytes.len(), e);
            return 0;
        }
    };

    let mut printed = 0;
    for msg in osc::flatten(packet) {
        if route_message(&msg, printer) {
            printed += 1;
        }
    }
    printed
}

/// Receive datagrams forever, printing what they contain.
pub fn run_receive_loop<W: Write>(socket: &OscSocket, printer: &mut ReadingPrinter<W>) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        match socket.recv(&mut buf) {
            Ok((len, from)) => {
                log::trace!("recv: {} bytes from {}", len, from);
                handle_datagram(&buf[..len], printer);
            }
            Err(ClientError::Receive(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                // An earlier send hit a closed port on the remote.
                log::warn!("Remote {} refused a datagram", socket.remote_addr());
            }
            Err(e) => {
                log::error!("{}", e);
                thread::sleep(RECV_ERROR_BACKOFF);
            }
        }
    }
}

/// Start the receive loop on its own thread, printing to stdout.
pub fn spawn_receiver(socket: OscSocket, config: PrinterConfig) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("osc-receive".to_string())
        .spawn(move || {
            let mut printer = ReadingPrinter::new(config, io::stdout());
            run_receive_loop(&socket, &mut printer);
        })
}

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

use trill_osc_client::osc::{self, OscMessage, OscType};
use trill_osc_client::OscSocket;

/// A [Command] is one named request for the remote device, e.g. `new bar 1 bar 32`.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<OscType>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<OscType>) -> Self {
        Command {
            name: name.into(),
            args,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<OscType>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn to_message(&self) -> OscMessage {
        osc::command_message(&self.name, &self.args)
    }

    pub fn encode(&self) -> Vec<u8> {
        osc::encode_command(&self.name, &self.args)
    }
}

/// The [CommandDispatcher] encodes commands and sends them to the device the socket was bound
/// against.
#[derive(Debug)]
pub struct CommandDispatcher {
    socket: OscSocket,
}

impl CommandDispatcher {
    pub fn new(socket: OscSocket) -> Self {
        CommandDispatcher { socket }
    }

    pub fn socket(&self) -> &OscSocket {
        &self.socket
    }

    /// Send command `name` with `args`. A failed send is logged and otherwise ignored; the
    /// number of bytes sent is returned for diagnostics.
    pub fn send(&self, name: &str, args: &[OscType]) -> Option<usize> {
        let buf = osc::encode_command(name, args);
        log::trace!("send: {} ({} bytes)", name, buf.len());

        match self.socket.send(&buf) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::error!(
                    "Error while sending command {} to {}: {}",
                    name,
                    self.socket.remote_addr(),
                    e
                );
                None
            }
        }
    }

    pub fn send_command(&self, cmd: &Command) -> Option<usize> {
        self.send(&cmd.name, &cmd.args)
    }
}

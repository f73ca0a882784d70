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

use std::net::UdpSocket;
use std::time::Duration;

use trill_osc_console::trill_osc_client::osc::{decode, OscMessage, OscPacket, OscType};
use trill_osc_console::trill_osc_client::{Endpoint, OscSocket, MAX_DATAGRAM_SIZE};
use trill_osc_console::*;

/// A stand-in for the trill-osc device: a plain UDP socket on loopback.
struct FakeDevice {
    socket: UdpSocket,
}

impl FakeDevice {
    fn new() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        FakeDevice { socket }
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.socket.local_addr().unwrap().port())
    }

    fn recv_message(&self) -> OscMessage {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (len, _) = self.socket.recv_from(&mut buf).unwrap();
        match decode(&buf[..len]).unwrap() {
            OscPacket::Message(msg) => msg,
            other => panic!("expected a message, got {:?}", other),
        }
    }
}

fn dispatcher_for(device: &FakeDevice) -> CommandDispatcher {
    let _ = env_logger::builder().is_test(true).try_init();
    CommandDispatcher::new(OscSocket::bind(0, &device.endpoint()).unwrap())
}

#[test]
fn test_send_new_command() {
    let device = FakeDevice::new();
    let dispatcher = dispatcher_for(&device);

    let sent = dispatcher.send("new", &["a".into(), OscType::Float(1.0), "bar".into()]);
    assert!(sent.is_some());

    let msg = device.recv_message();
    assert_eq!(msg.address, "/trill/command/new");
    assert_eq!(
        msg.args,
        vec![
            OscType::String("a".to_string()),
            OscType::Float(1.0),
            OscType::String("bar".to_string()),
        ]
    );
}

#[test]
fn test_send_command_builder() {
    let device = FakeDevice::new();
    let dispatcher = dispatcher_for(&device);

    let cmd = Command::new("setNoiseThreshold").arg("bar").arg(0.125f32);
    assert_eq!(cmd.to_message().address, "/trill/command/setNoiseThreshold");
    dispatcher.send_command(&cmd);

    let msg = device.recv_message();
    assert_eq!(msg, cmd.to_message());
}

#[test]
fn test_unsupported_args_are_skipped_not_fatal() {
    let device = FakeDevice::new();
    let dispatcher = dispatcher_for(&device);

    let cmd = Command::new("autoRead")
        .arg("bar")
        .arg(vec![1u8, 2, 3])
        .arg(1.0f32);
    assert_eq!(dispatcher.send_command(&cmd), Some(cmd.encode().len()));

    let msg = device.recv_message();
    assert_eq!(msg.address, "/trill/command/autoRead");
    assert_eq!(
        msg.args,
        vec![OscType::String("bar".to_string()), OscType::Float(1.0)]
    );
}

#[test]
fn test_commands_arrive_in_send_order() {
    let device = FakeDevice::new();
    let dispatcher = dispatcher_for(&device);

    for name in ["createAll", "autoReadAll", "listAll"] {
        dispatcher.send(name, &[]);
    }
    for name in ["createAll", "autoReadAll", "listAll"] {
        let expected = format!("/trill/command/{}", name);
        assert_eq!(device.recv_message().address, expected);
    }
}

#[test]
fn test_failed_send_is_logged_not_fatal() {
    let device = FakeDevice::new();
    let dispatcher = dispatcher_for(&device);

    // Larger than any UDP datagram, so the OS refuses it.
    let oversized = "x".repeat(70_000);
    let sent = dispatcher.send("setMode", &["bar".into(), oversized.into()]);
    assert_eq!(sent, None);

    // The socket is still usable afterwards.
    assert!(dispatcher.send("listAll", &[]).is_some());
    assert_eq!(device.recv_message().address, "/trill/command/listAll");
}

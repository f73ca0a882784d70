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

use trill_osc_console::printer::format_message;
use trill_osc_console::receiver::{handle_datagram, route_message};
use trill_osc_console::trill_osc_client::osc::*;
use trill_osc_console::{PrinterConfig, ReadingPrinter};

fn printer(log_readings: bool) -> ReadingPrinter<Vec<u8>> {
    ReadingPrinter::new(PrinterConfig::new(log_readings), Vec::new())
}

fn output(printer: ReadingPrinter<Vec<u8>>) -> String {
    String::from_utf8(printer.into_inner()).unwrap()
}

fn touches() -> OscMessage {
    OscMessage::new(
        "/trill/readings/bar/touches",
        vec![OscType::Float(1.0), OscType::Float(0.25), OscType::Float(0.5)],
    )
}

fn reply() -> OscMessage {
    OscMessage::new(
        "/trill/commandreply",
        vec!["listAll".into(), OscType::Int(2)],
    )
}

#[test]
fn test_format_message() {
    assert_eq!(
        format_message(&touches()),
        "address: /trill/readings/bar/touches\n  float 1\n  float 0.25\n  float 0.5\n"
    );
    assert_eq!(
        format_message(&reply()),
        "address: /trill/commandreply\n  string listAll\n  integer 2\n"
    );
}

#[test]
fn test_blob_prints_as_floats() {
    let mut data: Vec<u8> = [0.1f32, 123456.0, -2.5]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    data.extend_from_slice(&[0xAA, 0xBB]);

    let msg = OscMessage::new("/trill/readings/sq/diff", vec![OscType::Blob(data)]);
    assert_eq!(
        format_message(&msg),
        "address: /trill/readings/sq/diff\n  blob(14 bytes) [0.10000, 1.2346e+5, -2.5000]\n"
    );
}

#[test]
fn test_readings_hidden_when_disabled() {
    let mut p = printer(false);
    assert!(!p.print(&touches()).unwrap());
    assert!(!p
        .print(&OscMessage::new("/trill/readings", vec![]))
        .unwrap());
    assert!(p.print(&reply()).unwrap());

    let out = output(p);
    assert!(!out.contains("/trill/readings"));
    assert!(out.starts_with("address: /trill/commandreply\n"));
}

#[test]
fn test_toggle_is_seen_by_printer() {
    let config = PrinterConfig::default();
    assert!(config.log_readings());

    let mut p = ReadingPrinter::new(config.clone(), Vec::new());
    assert!(p.print(&touches()).unwrap());

    config.set_log_readings(false);
    assert!(!p.print(&touches()).unwrap());

    config.set_log_readings(true);
    assert!(p.print(&touches()).unwrap());

    assert_eq!(output(p).matches("address:").count(), 2);
}

#[test]
fn test_malformed_address_never_printed() {
    let mut p = printer(true);
    assert!(!route_message(&OscMessage::new("trill", vec![]), &mut p));
    assert!(!route_message(&OscMessage::new("", vec![]), &mut p));
    assert!(route_message(&reply(), &mut p));

    let out = output(p);
    assert_eq!(out.matches("address:").count(), 1);
}

#[test]
fn test_datagram_bundle_handled_in_order() {
    let bundle = OscPacket::Bundle(OscBundle {
        timetag: TIMETAG_IMMEDIATE,
        content: vec![OscPacket::Message(reply()), OscPacket::Message(touches())],
    });

    let mut p = printer(true);
    assert_eq!(handle_datagram(&encode_packet(&bundle), &mut p), 2);

    let out = output(p);
    let reply_at = out.find("/trill/commandreply").unwrap();
    let touches_at = out.find("/trill/readings/bar/touches").unwrap();
    assert!(reply_at < touches_at);
}

#[test]
fn test_datagram_bundle_filters_each_message() {
    let bundle = OscPacket::Bundle(OscBundle {
        timetag: TIMETAG_IMMEDIATE,
        content: vec![
            OscPacket::Message(touches()),
            OscPacket::Message(OscMessage::new("nope", vec![])),
            OscPacket::Message(reply()),
        ],
    });

    let mut p = printer(false);
    assert_eq!(handle_datagram(&encode_packet(&bundle), &mut p), 1);
    assert_eq!(
        output(p),
        "address: /trill/commandreply\n  string listAll\n  integer 2\n"
    );
}

#[test]
fn test_undecodable_datagram_dropped() {
    let mut p = printer(true);
    assert_eq!(handle_datagram(b"/trill/readings", &mut p), 0);
    assert_eq!(handle_datagram(&[], &mut p), 0);
    assert!(output(p).is_empty());
}

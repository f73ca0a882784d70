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

use std::io;

use clap::Parser;
use trill_osc_console::help::SHELL_HELP;
use trill_osc_console::trill_osc_client::{
    Endpoint, OscSocket, DEFAULT_LOCAL_PORT, DEFAULT_REMOTE_HOST, DEFAULT_REMOTE_PORT,
};
use trill_osc_console::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    // Host running the trill-osc device program. Passing `help` here prints usage and exits.
    remote_host: Option<String>,

    // Port the device program listens on.
    remote_port: Option<u16>,

    // Local port to receive command replies and readings on.
    local_port: Option<u16>,

    // Only print incoming messages, don't start the interactive console.
    #[arg(long, default_value_t = false)]
    listen_only: bool,
}

/// A first argument of `help` prints usage and exits, whatever follows it.
fn is_help_request<I, S>(argv: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    argv.into_iter()
        .nth(1)
        .is_some_and(|arg| arg.as_ref() == "help")
}

/// Everything fixed at startup: where to send, where to listen.
#[derive(Debug, PartialEq)]
struct BridgeConfig {
    remote: Endpoint,
    local_port: u16,
    listen_only: bool,
}

impl From<Args> for BridgeConfig {
    fn from(args: Args) -> Self {
        BridgeConfig {
            remote: Endpoint::new(
                args.remote_host
                    .unwrap_or_else(|| DEFAULT_REMOTE_HOST.to_string()),
                args.remote_port.unwrap_or(DEFAULT_REMOTE_PORT),
            ),
            local_port: args.local_port.unwrap_or(DEFAULT_LOCAL_PORT),
            listen_only: args.listen_only,
        }
    }
}

fn usage() -> String {
    [
        "Usage:".to_string(),
        "`trill_invoke <remoteHost> <remotePort> <localPort>`".to_string(),
        "All parameters are optional, defaults to:".to_string(),
        format!(
            "`trill_invoke {} {} {}`",
            DEFAULT_REMOTE_HOST, DEFAULT_REMOTE_PORT, DEFAULT_LOCAL_PORT
        ),
    ]
    .join("\n")
}

fn main() {
    // Diagnostics such as dropped messages and failed sends should show up without RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if is_help_request(std::env::args_os().map(|a| a.to_string_lossy().into_owned())) {
        println!("{}", usage());
        return;
    }
    let args = Args::parse();

    let config = BridgeConfig::from(args);
    println!(
        "send to: {}, receive on: :{}",
        config.remote, config.local_port
    );

    // The process can't do anything useful without its receive socket.
    let socket = match OscSocket::bind(config.local_port, &config.remote) {
        Ok(socket) => socket,
        Err(e) => {
            eprintln!("Error opening UDP socket: {e}");
            std::process::exit(1);
        }
    };

    let printer_config = PrinterConfig::default();
    let rx_socket = socket.try_clone().unwrap_or_else(|e| {
        eprintln!("Error cloning UDP socket: {e}");
        std::process::exit(1);
    });
    let receiver = spawn_receiver(rx_socket, printer_config.clone()).unwrap_or_else(|e| {
        eprintln!("Error starting receive thread: {e}");
        std::process::exit(1);
    });

    print!("{}", SHELL_HELP);

    if config.listen_only {
        println!("Listening only, press Ctrl-C to exit.");
        if receiver.join().is_err() {
            log::error!("Receive thread panicked!");
        }
        return;
    }

    println!("This is an interactive console. Type `help` for the list of commands.");
    let dispatcher = CommandDispatcher::new(socket);
    let shell = Shell::new(&dispatcher, printer_config);

    let mut stdout = io::stdout();
    if let Err(e) = shell.run(io::stdin().lock(), &mut stdout) {
        log::error!("Console input failed: {}", e);
    }
}

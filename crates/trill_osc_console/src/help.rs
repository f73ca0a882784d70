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

/// Printed by the `help` shell command and once at startup.
pub const SHELL_HELP: &str = r#"A console to talk to the trill-osc device program.

Send a command by typing its name followed by its arguments:
    <command> [args ...]
    send <command> [args ...]     (also works for names like `help`)

Every command is sent to "/trill/command/<command>". Bare numbers are sent as
floats; anything else, or anything in quotes, is sent as a string:
    new bar 1 bar        -> "bar" 1.0 "bar"
    new bar 1 "32"       -> "bar" 1.0 "32"

Global commands:
  list all enabled devices:
    listAll
  discover and create all Trill devices on the specified i2cBus:
    createAll <i2cBus>
  delete all active Trill devices:
    deleteAll
  set all devices to read (and send) new data automatically:
    autoReadAll
  disable automatic reading for all devices:
    stopReadAll
  sleep `ms` in between reads (and sends):
    loopSleep <ms>

Instance commands, all starting with a string id:
  create a device on I2C bus `i2cBus` of type `deviceType` ("bar", "square",
  "craft", "ring", "hex", "flex" or "unknown") at `i2cAddress` (optional, but
  required for "unknown"):
    new <id> <i2cBus> <deviceType> [i2cAddress]
  delete an existing device:
    delete <id>
  read (and send) data automatically if `shouldDo` is non-zero:
    autoRead <id> <shouldDo>
  read (and send) data once:
    readI2C <id>
  map directly onto the Trill device API:
    updateBaseline <id>
    setPrescaler <id> <value>
    setNoiseThreshold <id> <value>
    setMode <id> <mode>          (mode: centroid, raw, baseline or diff)
    setScanSettings <id> <speed> <numBits>

Incoming messages:
  replies to commands:
    /trill/commandreply
  1D devices in centroid mode:
    /trill/readings/<id>/touches <num-touches> <loc0> <size0> <loc1> <size1> ...
  2D devices in centroid mode:
    /trill/readings/<id>/touchXY <num-touches> <x> <y> <size>
  devices in raw, baseline or diff mode:
    /trill/readings/<id>/raw <c0> <c1> ...
    /trill/readings/<id>/baseline <c0> <c1> ...
    /trill/readings/<id>/diff <c0> <c1> ...

Console commands:
    logReadings               show whether readings are printed
    logReadings on|off        print (default) or hide /trill/readings messages
    help                      print this message again
    quit                      leave the console
"#;

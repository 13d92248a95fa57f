//! End-to-end tests over real TCP: spawn the server on an ephemeral port,
//! speak the length-prefixed protocol from a client socket.

use std::io::{Cursor, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use image::ImageFormat;
use vision_bridge::{Config, ServerHandle, VisionServer};

fn spawn_server(mut config: Config) -> ServerHandle {
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    VisionServer::new(config).spawn().expect("spawn server")
}

fn connect(handle: &ServerHandle) -> TcpStream {
    let stream = TcpStream::connect(handle.addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("read timeout");
    stream
}

fn png_bytes(rgb: [u8; 3], width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).expect("encode");
    bytes.into_inner()
}

fn send_frame(stream: &mut TcpStream, payload: &[u8]) {
    let mut wire = (payload.len() as u32).to_le_bytes().to_vec();
    wire.extend_from_slice(payload);
    stream.write_all(&wire).expect("send frame");
}

fn read_reply(stream: &mut TcpStream) -> Vec<u8> {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).expect("read prefix");
    let len = u32::from_le_bytes(prefix) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).expect("read payload");
    payload
}

#[test]
fn red_frame_gets_movered_black_frame_gets_idle() {
    let handle = spawn_server(Config::default());
    let mut client = connect(&handle);

    send_frame(&mut client, &png_bytes([255, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"movered");

    send_frame(&mut client, &png_bytes([0, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"idle");

    drop(client);
    handle.stop().expect("stop server");
}

#[test]
fn reply_framing_is_length_prefixed_little_endian() {
    let handle = spawn_server(Config::default());
    let mut client = connect(&handle);

    send_frame(&mut client, &png_bytes([255, 0, 0], 10, 10));
    let mut prefix = [0u8; 4];
    client.read_exact(&mut prefix).expect("read prefix");
    assert_eq!(prefix, [8, 0, 0, 0]);
    let mut payload = [0u8; 8];
    client.read_exact(&mut payload).expect("read payload");
    assert_eq!(&payload[..], &b"movered"[..]);

    drop(client);
    handle.stop().expect("stop server");
}

#[test]
fn decode_failure_ends_session_but_listener_survives() {
    let handle = spawn_server(Config::default());

    // First session: garbage payload. Server must close without replying.
    let mut bad_client = connect(&handle);
    send_frame(&mut bad_client, b"definitely not an image");
    let mut buf = [0u8; 16];
    let read = bad_client.read(&mut buf).expect("read after bad frame");
    assert_eq!(read, 0, "server should close without answering a bad frame");
    drop(bad_client);

    // Second session: still served correctly.
    let mut good_client = connect(&handle);
    send_frame(&mut good_client, &png_bytes([255, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut good_client), b"movered");

    drop(good_client);
    handle.stop().expect("stop server");
}

#[test]
fn clean_disconnect_is_not_fatal_to_the_listener() {
    let handle = spawn_server(Config::default());

    // Connect and leave without sending anything.
    let silent = connect(&handle);
    drop(silent);

    let mut client = connect(&handle);
    send_frame(&mut client, &png_bytes([0, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"idle");

    drop(client);
    handle.stop().expect("stop server");
}

#[test]
fn threshold_is_applied_per_configuration() {
    // An all-red frame has ratio 1.0; a threshold of 1.0 still triggers.
    let mut config = Config::default();
    config.min_red_ratio = 1.0;
    let handle = spawn_server(config);
    let mut client = connect(&handle);

    send_frame(&mut client, &png_bytes([255, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"movered");

    drop(client);
    handle.stop().expect("stop server");
}

#[test]
fn display_mode_writes_one_snapshot_per_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.display = true;
    config.display_dir = dir.path().to_path_buf();

    let handle = spawn_server(config);
    let mut client = connect(&handle);

    send_frame(&mut client, &png_bytes([255, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"movered");
    send_frame(&mut client, &png_bytes([0, 0, 0], 10, 10));
    assert_eq!(read_reply(&mut client), b"idle");

    drop(client);
    handle.stop().expect("stop server");

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read debug dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].contains("movered"), "got {:?}", names);
    assert!(names[1].contains("idle"), "got {:?}", names);
}

use std::{io::Cursor, sync::mpsc, thread};

use crate::{
    GnssSession, IoSource, Refresh, SentenceId, SessionConfig, SessionError, checksum,
    format_checksum,
    nmea_content::{Fix, Hemisphere},
};

fn frame(body: &str, ending: &str) -> Vec<u8> {
    let (_, cc) = checksum(body);
    format!("${body}*{}{ending}", format_checksum(cc)).into_bytes()
}

fn config(sentences_per_cycle: usize) -> SessionConfig {
    SessionConfig::default()
        .with_sentences_per_cycle(sentences_per_cycle)
        .with_idle_read_limit(Some(0))
}

#[test]
fn test_serial_stream_with_noise() {
    let mut bytes = b"4,W,1,08*1F\r\n".to_vec();
    // ACK-ACK for CFG-RATE, answered in between two sentences
    bytes.extend_from_slice(&[0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x08, 0x16, 0x3F]);
    bytes.extend(frame("GNGLL,4717.11399,N,00833.91590,E,092725.00,A,A", "\r\n"));
    bytes.extend(frame("GNRMC,092725.00,A,4717.11399,N,00833.91590,E,0.004,77.52,091202,,", "\n"));
    bytes.extend(frame(
        "GNGGA,092725.00,4717.11399,N,00833.91590,E,1,08,1.01,499.6,M,48.0,M,,",
        "\r\n",
    ));
    bytes.extend(frame("GNGSA,A,3,80,71,73,79,69,,,,,,,,1.83,1.09,1.47", "\r\n"));

    let mut session = GnssSession::with_config(IoSource::new(Cursor::new(bytes)), config(4));
    let fused = session.fused_fix(Refresh::Cycle).unwrap();

    let Fix::Fix(position) = fused.position else {
        panic!("expected a position");
    };
    assert_eq!(position.latitude.hemisphere, Hemisphere::North);
    assert!((position.longitude.signed() - (8.0 + 33.9159 / 60.0)).abs() < 1e-9);
    assert!((position.horizontal_error.unwrap() - 1.09 * 2.5).abs() < 1e-5);

    let Fix::Fix(velocity) = fused.velocity else {
        panic!("expected a velocity");
    };
    assert_eq!(velocity.course_over_ground, Some(77.52));
    assert_eq!(velocity.time.unwrap().to_string(), "09:27:25");

    let Fix::Fix(altitude) = fused.altitude else {
        panic!("expected an altitude");
    };
    assert_eq!(altitude.altitude.unwrap().to_string(), "499.6 M");
    assert!(fused.error_3d.is_some());

    assert_eq!(session.stats().frames, 4);
    assert_eq!(session.stats().stored, 4);
    assert_eq!(session.store().get(SentenceId::GLL).unwrap().talker().as_str(), "GN");
}

#[test]
fn test_reader_thread() {
    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        let bytes = [
            frame("GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E", "\r\n"),
            frame("GPGLL,4916.45,N,12311.12,W,225444,V,N", "\r\n"),
        ]
        .concat();
        for byte in bytes {
            tx.send(byte).unwrap();
        }
    });

    let mut session = GnssSession::new(rx);
    session.refresh(2).unwrap();
    reader.join().unwrap();

    assert!(session.velocity(Refresh::Skip).unwrap().is_fix());
    assert_eq!(session.position(Refresh::Skip).unwrap(), Fix::NoFix);

    // The sender is gone, nothing more can arrive
    assert!(matches!(session.refresh(1), Err(SessionError::Io(_))));
}

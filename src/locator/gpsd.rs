use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use super::{LocatorError, SampleSource};
use crate::tracker::PositionFix;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Position source backed by a gpsd daemon speaking newline-delimited JSON.
pub struct GpsdSource {
    addr: String,
    read_timeout: Duration,
    conn: Option<Conn>,
}

struct Conn {
    lines: Lines<BufReader<OwnedReadHalf>>,
    // Keeps the write half (and so the watch subscription) alive.
    _writer: OwnedWriteHalf,
}

#[derive(Debug, Deserialize)]
struct GpsdReport {
    class: String,
    #[serde(default)]
    mode: i32,
    lat: Option<f64>,
    lon: Option<f64>,
    alt: Option<f64>,
    epv: Option<f64>,
    eph: Option<f64>,
    speed: Option<f64>,
    track: Option<f64>,
    time: Option<DateTime<Utc>>,
}

impl GpsdSource {
    pub fn new(addr: String) -> Self {
        Self {
            addr,
            read_timeout: Duration::from_secs(10),
            conn: None,
        }
    }

    async fn connect(&self) -> Result<Conn, LocatorError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read_half, mut writer) = stream.into_split();
        writer.write_all(WATCH_COMMAND).await?;
        Ok(Conn {
            lines: BufReader::new(read_half).lines(),
            _writer: writer,
        })
    }
}

#[async_trait]
impl SampleSource for GpsdSource {
    async fn initialize(&mut self, interval: Duration) -> Result<(), LocatorError> {
        self.read_timeout = interval.max(Duration::from_secs(1));
        let conn = self.connect().await?;
        self.conn = Some(conn);
        log::info!("Connected to gpsd at {}", self.addr);
        Ok(())
    }

    async fn current_fix(&mut self) -> Result<PositionFix, LocatorError> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            // Connection was lost on an earlier tick; reacquire.
            None => self.connect().await?,
        };

        let deadline = Instant::now() + self.read_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.conn = Some(conn);
                return Err(LocatorError::NoFix(
                    "no position report within the read window".to_string(),
                ));
            }

            match timeout(remaining, conn.lines.next_line()).await {
                Err(_) => {
                    self.conn = Some(conn);
                    return Err(LocatorError::NoFix(
                        "no position report within the read window".to_string(),
                    ));
                }
                Ok(Err(e)) => return Err(LocatorError::Io(e)),
                Ok(Ok(None)) => {
                    return Err(LocatorError::NoFix(
                        "gpsd closed the connection".to_string(),
                    ))
                }
                Ok(Ok(Some(line))) => {
                    let Some(report) = parse_report(&line) else {
                        continue;
                    };
                    let result = fix_from_tpv(report);
                    self.conn = Some(conn);
                    return result;
                }
            }
        }
    }
}

/// Returns the parsed report only for TPV messages; VERSION, DEVICES, SKY
/// and malformed lines are skipped.
fn parse_report(line: &str) -> Option<GpsdReport> {
    let report: GpsdReport = serde_json::from_str(line).ok()?;
    (report.class == "TPV").then_some(report)
}

fn fix_from_tpv(tpv: GpsdReport) -> Result<PositionFix, LocatorError> {
    if tpv.mode < 2 {
        return Err(LocatorError::NoFix(format!("no fix (mode {})", tpv.mode)));
    }
    let (Some(lat), Some(lon), Some(time)) = (tpv.lat, tpv.lon, tpv.time) else {
        return Err(LocatorError::NoFix(
            "incomplete position report".to_string(),
        ));
    };

    Ok(PositionFix {
        latitude: lat,
        longitude: lon,
        altitude: tpv.alt.unwrap_or(0.0),
        vertical_accuracy: tpv.epv.unwrap_or(0.0),
        horizontal_accuracy: tpv.eph.unwrap_or(0.0),
        speed: tpv.speed.unwrap_or(0.0) as f32,
        course: tpv.track.unwrap_or(0.0) as f32,
        method: tpv.mode,
        timestamp: time,
    })
}

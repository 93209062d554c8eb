use crate::{SensorError, SensorResult};
use std::path::{Path, PathBuf};
use therm_config_and_utils::{Reading, SensorConfig, SensorSource, TemperatureUnit};
use tracing::{debug, warn};

const CRC_OK: &str = "YES";
const TEMP_MARKER: &str = "t=";

/// Parse the contents of a `w1_slave` file into millidegrees Celsius.
pub fn parse_w1_slave(contents: &str) -> SensorResult<i32> {
    let mut lines = contents.lines();

    let status = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| SensorError::Malformed("missing status line".to_string()))?;
    if !status.ends_with(CRC_OK) {
        return Err(SensorError::Malformed(format!(
            "CRC check failed: {status:?}"
        )));
    }

    let data = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| SensorError::Malformed("missing data line".to_string()))?;
    let pos = data
        .rfind(TEMP_MARKER)
        .ok_or_else(|| SensorError::Malformed(format!("no temperature in {data:?}")))?;

    let raw = data[pos + TEMP_MARKER.len()..].trim_start();
    raw.parse::<i32>()
        .map_err(|e| SensorError::Malformed(format!("bad temperature {raw:?}: {e}")))
}

/// [`SensorSource`] over one `w1_slave` file.
#[derive(Debug, Clone)]
pub struct W1ThermReader {
    path: PathBuf,
    name: String,
    unit: TemperatureUnit,
}

impl W1ThermReader {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, unit: TemperatureUnit) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            unit,
        }
    }

    pub fn from_config(config: &SensorConfig) -> SensorResult<Self> {
        let path = config.w1_slave_path.as_ref().ok_or(SensorError::MissingPath)?;
        Ok(Self::new(path, config.name.clone(), config.unit))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the file once and return the raw millidegree value.
    pub fn sample(&self) -> SensorResult<i32> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse_w1_slave(&contents)
    }

    fn convert(&self, millidegrees: i32) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => f64::from(millidegrees) / 1000.0,
            TemperatureUnit::Millidegrees => f64::from(millidegrees),
        }
    }
}

impl SensorSource for W1ThermReader {
    fn read(&mut self) -> Option<Reading> {
        match self.sample() {
            Ok(millidegrees) => {
                let value = self.convert(millidegrees);
                debug!(name = %self.name, millidegrees, value, "Sensor sampled");
                Some(Reading::now(self.name.clone(), value))
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Cannot read sensor sample"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GOOD: &str = "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n\
                        72 01 4b 46 7f ff 0e 10 57 t=23125\n";

    fn malformed(contents: &str) -> bool {
        matches!(parse_w1_slave(contents), Err(SensorError::Malformed(_)))
    }

    #[test]
    fn parses_valid_sample() {
        assert_eq!(parse_w1_slave(GOOD).unwrap(), 23125);
    }

    #[test]
    fn parses_negative_and_zero() {
        assert_eq!(
            parse_w1_slave("aa : crc=aa YES\naa t=-10125\n").unwrap(),
            -10125
        );
        assert_eq!(parse_w1_slave("aa : crc=aa YES\naa t=0").unwrap(), 0);
    }

    #[test]
    fn uses_last_marker_on_data_line() {
        assert_eq!(
            parse_w1_slave("x YES\nt=1 junk t=2250\n").unwrap(),
            2250
        );
    }

    #[test]
    fn accepts_crlf_line_endings() {
        assert_eq!(parse_w1_slave("x YES\r\nx t=1500\r\n").unwrap(), 1500);
    }

    #[test]
    fn rejects_failed_crc() {
        assert!(malformed(
            "72 01 4b 46 7f ff 0e 10 57 : crc=57 NO\n72 01 4b 46 7f ff 0e 10 57 t=23125\n"
        ));
        assert!(malformed("x YES \nx t=1\n"));
    }

    #[test]
    fn rejects_missing_lines() {
        assert!(malformed(""));
        assert!(malformed("\nx t=1\n"));
        assert!(malformed("x YES\n"));
        assert!(malformed("x YES\n\n"));
    }

    #[test]
    fn rejects_bad_temperature_field() {
        assert!(malformed("x YES\nx 23125\n"));
        assert!(malformed("x YES\nx t=\n"));
        assert!(malformed("x YES\nx t=12ab\n"));
        assert!(malformed("x YES\nx t=1.5\n"));
        assert!(malformed("x YES\nx t=23125 \n"));
        assert!(malformed("x YES\nx t=99999999999\n"));
    }

    #[test]
    fn reader_converts_units() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("w1_slave");
        std::fs::write(&path, GOOD).unwrap();

        let mut celsius = W1ThermReader::new(&path, "kitchen", TemperatureUnit::Celsius);
        let reading = celsius.read().unwrap();
        assert_eq!(reading.sensor_name, "kitchen");
        assert_eq!(reading.value, 23.125);
        assert!(reading.timestamp > 0);

        let mut raw = W1ThermReader::new(&path, "kitchen", TemperatureUnit::Millidegrees);
        assert_eq!(raw.read().unwrap().value, 23125.0);
    }

    #[test]
    fn reader_returns_none_on_missing_or_bad_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("w1_slave");

        let mut reader = W1ThermReader::new(&path, "kitchen", TemperatureUnit::Celsius);
        assert!(reader.read().is_none());
        assert!(matches!(reader.sample(), Err(SensorError::Io(_))));

        std::fs::write(&path, "x NO\nx t=1\n").unwrap();
        assert!(reader.read().is_none());
    }

    #[test]
    fn from_config_requires_path() {
        let mut config = SensorConfig::default();
        assert!(matches!(
            W1ThermReader::from_config(&config),
            Err(SensorError::MissingPath)
        ));

        config.w1_slave_path = Some(PathBuf::from("/sys/bus/w1/devices/28-0000/w1_slave"));
        config.unit = TemperatureUnit::Millidegrees;
        let reader = W1ThermReader::from_config(&config).unwrap();
        assert_eq!(reader.path(), Path::new("/sys/bus/w1/devices/28-0000/w1_slave"));
        assert_eq!(reader.name(), config.name);
    }
}

//! DS18B20 sensor reader.
//!
//! The kernel `w1_therm` driver exposes each probe as a two-line `w1_slave` file:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The first line must end in `YES` (CRC ok); the second carries the temperature in
//! millidegrees Celsius after the last `t=`.

mod error;
mod reader;

pub use error::{SensorError, SensorResult};
pub use reader::{parse_w1_slave, W1ThermReader};

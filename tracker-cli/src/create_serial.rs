use tokio::io::{split, AsyncReadExt, ReadHalf, WriteHalf};

use anyhow::Result;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

#[derive(Debug)]
pub struct SerialErrorWrapper(std::io::Error);

impl embedded_io_async::Error for SerialErrorWrapper {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        embedded_io_async::ErrorKind::Other
    }
}

pub struct SerialRXWrapper(ReadHalf<SerialStream>);

impl embedded_io_async::ErrorType for SerialRXWrapper {
    type Error = SerialErrorWrapper;
}

impl embedded_io_async::Read for SerialRXWrapper {
    async fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, Self::Error> {
        self.0.read(buf).await.map_err(SerialErrorWrapper)
    }
}

pub fn create_serial(
    serial_port_name: &str,
    baud_rate: u32,
) -> Result<(SerialRXWrapper, WriteHalf<SerialStream>)> {
    let serial: SerialStream = tokio_serial::new(serial_port_name, baud_rate).open_native_async()?;
    let (rx, tx) = split(serial);
    Ok((SerialRXWrapper(rx), tx))
}

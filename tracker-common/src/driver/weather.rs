use tiny_aprs::WeatherReport;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temperature: f32,       // C
    pub humidity: Option<f32>,  // %
    pub pressure: f32,          // Pa
}

pub trait WeatherSensor {
    /// `None` when no reading is available right now.
    fn read(&mut self) -> Option<WeatherReading>;
}

impl<T: WeatherSensor> WeatherSensor for &mut T {
    fn read(&mut self) -> Option<WeatherReading> {
        (**self).read()
    }
}

pub struct NoWeatherSensor {}

impl WeatherSensor for NoWeatherSensor {
    fn read(&mut self) -> Option<WeatherReading> {
        None
    }
}

impl From<WeatherReading> for WeatherReport {
    fn from(reading: WeatherReading) -> Self {
        WeatherReport {
            temperature: Some(reading.temperature),
            humidity: reading
                .humidity
                .map(|humidity| libm::roundf(humidity.clamp(0.0, 100.0)) as u8),
            pressure: Some(reading.pressure),
            ..Default::default()
        }
    }
}

pub mod alerts;
pub mod aqi;
pub mod forecast;
pub mod openweather;
#[cfg(test)]
pub mod testing;

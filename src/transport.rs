//! Register-level access to a PCA9655 over the bus.
//!
//! The driver never talks to the bus directly. Everything goes through
//! [`RegisterTransport`], which any `embedded-hal` I2C bus implements.

use embedded_hal::i2c::I2c;

/// Byte-wide register reads and writes addressed by 7-bit device address.
pub trait RegisterTransport {
    /// Bus error type
    type Error;

    /// Writes `value` into `register` of the device at `address`.
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Reads one byte from `register` of the device at `address`.
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error>;

    /// Reads `register` and `register + 1` into a word, first byte low.
    fn read_register_pair(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let low = self.read_register(address, register)?;
        let high = self.read_register(address, register + 1)?;
        Ok(u16::from(low) | (u16::from(high) << 8))
    }
}

impl<I2C: I2c> RegisterTransport for I2C {
    type Error = I2C::Error;

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }

    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0u8; 1];
        self.write_read(address, &[register], &mut buffer)?;
        Ok(buffer[0])
    }

    // The PCA9655 command register auto-increments within a register pair.
    fn read_register_pair(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let mut buffer = [0u8; 2];
        self.write_read(address, &[register], &mut buffer)?;
        Ok(u16::from(buffer[0]) | (u16::from(buffer[1]) << 8))
    }
}

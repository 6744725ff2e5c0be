//! Digital64 GPIO Expander Bank Driver
//!
//! A platform-agnostic driver for a 64 digital I/O bank built from four PCA9655
//! 16-bit I2C GPIO expanders (the "OOMORI" 64 digital I/O shield).
//!
//! Each chip exposes 16 pins split into two 8-pin ports. Pins can be driven:
//! - by chip, port and bit ([`Digital64::digital_write`])
//! - by chip and flat pin 0-15 ([`Digital64::digital_write_flat`])
//! - by global pin 0-63 across the bank ([`Digital64::digital_write_global`])
//! - a whole port or chip at a time ([`Digital64::port_write`], [`Digital64::port_write_all`])
//!
//! The direction and output registers are treated as write-only. The driver keeps a
//! shadow copy of each one and every single-pin change is a read-modify-write of that
//! shadow followed by a full register write.
//!
//! # Features
//!
//! - `no_std` compatible, no allocator
//! - Uses `embedded-hal` I2C for the bus
//! - `defmt` feature for register-level logging
//!
//! # Example
//!
//! ```ignore
//! use digital64::{Bank, Chip, Digital64, PinMode, PinState, Port};
//! # let i2c = todo!();
//!
//! // ADDR_SEL strap in position 0
//! let mut io = Digital64::new(i2c, Bank::Bank0);
//!
//! // All pins input, non-inverted, output latches high
//! io.init().unwrap();
//!
//! // Drive chip B, port 1, bit 3 low
//! io.pin_mode(Chip::B, Port::P1, 3, PinMode::Output).unwrap();
//! io.digital_write(Chip::B, Port::P1, 3, PinState::Low).unwrap();
//!
//! // Read global pin 42 (chip C, flat pin 10)
//! let state = io.digital_read_global(42).unwrap();
//! ```

#![no_std]

pub mod pin;
pub mod transport;

pub use embedded_hal::digital::PinState;
pub use pin::{Bank, Chip, InvalidIndex, PinAddress, Port, PortPin};
pub use transport::RegisterTransport;

use pin::MAX_PORT_PIN;

// Register base addresses, the port number is added to select port 0 or 1
/// Input port register (read-only, reflects pin level after polarity inversion)
pub const PCA9655_REG_INPUT: u8 = 0x00;
/// Output port register
pub const PCA9655_REG_OUTPUT: u8 = 0x02;
/// Polarity inversion register (1 = inverted)
pub const PCA9655_REG_POLARITY: u8 = 0x04;
/// Configuration register (1 = input, 0 = output)
pub const PCA9655_REG_CONFIG: u8 = 0x06;

/// Power-on value of the output and configuration registers
const REG_DEFAULT: u8 = 0xFF;

/// Direction of a single pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Configuration bit set
    Input,
    /// Configuration bit cleared
    Output,
}

impl From<u8> for PinMode {
    /// 0 selects input, anything else selects output.
    fn from(value: u8) -> Self {
        if value == 0 {
            PinMode::Input
        } else {
            PinMode::Output
        }
    }
}

/// Errors that can occur when interacting with the expander bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Digital64Error<E> {
    /// Invalid argument passed to a method (e.g., pin number out of range)
    InvalidArgument,
    /// Register read failed
    ReadError(E),
    /// Register write failed
    WriteError(E),
}

impl<E> From<InvalidIndex> for Digital64Error<E> {
    fn from(_: InvalidIndex) -> Self {
        Digital64Error::InvalidArgument
    }
}

/// Driver for four PCA9655 chips sharing one bus.
///
/// Holds the output and configuration shadows for every chip and port. All access
/// goes through `&mut self`; sharing a bank between contexts needs an external lock.
pub struct Digital64<T: RegisterTransport> {
    transport: T,
    bank: Bank,
    output: [[u8; Port::COUNT]; Chip::COUNT],
    config: [[u8; Port::COUNT]; Chip::COUNT],
}

impl<T: RegisterTransport> Digital64<T> {
    /// Creates a new driver instance without touching the bus.
    ///
    /// Shadows start at the chip's power-on state (all inputs, outputs latched high).
    /// Call [`init`](Self::init) to force the hardware into that state.
    ///
    /// # Arguments
    ///
    /// * `transport` - Register transport, usually an `embedded-hal` I2C bus
    /// * `bank` - ADDR_SEL strap position of the shield
    pub fn new(transport: T, bank: Bank) -> Self {
        Self {
            transport,
            bank,
            output: [[REG_DEFAULT; Port::COUNT]; Chip::COUNT],
            config: [[REG_DEFAULT; Port::COUNT]; Chip::COUNT],
        }
    }

    /// Consumes the driver and returns the transport.
    pub fn destroy(self) -> T {
        self.transport
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// 7-bit I2C address used for `chip`.
    pub fn device_address(&self, chip: Chip) -> u8 {
        self.bank.device_address(chip)
    }

    /// Last value written (or attempted) to the configuration register of `chip`/`port`.
    pub fn config_shadow(&self, chip: Chip, port: Port) -> u8 {
        self.config[chip.index()][port.index()]
    }

    /// Last value written (or attempted) to the output register of `chip`/`port`.
    pub fn output_shadow(&self, chip: Chip, port: Port) -> u8 {
        self.output[chip.index()][port.index()]
    }

    /// Puts every chip into a known state.
    ///
    /// For each chip and port, in chip-major order: configuration 0xFF (all inputs),
    /// polarity 0x00 (not inverted), output 0xFF. Pins switched to output afterwards
    /// will therefore drive high until written.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failed write.
    pub fn init(&mut self) -> Result<(), Digital64Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("digital64: init {}", self.bank);

        self.config = [[REG_DEFAULT; Port::COUNT]; Chip::COUNT];
        self.output = [[REG_DEFAULT; Port::COUNT]; Chip::COUNT];

        for chip in Chip::ALL {
            for port in Port::ALL {
                self.set_config(chip, port, REG_DEFAULT)?;
                self.set_polarity(chip, port, 0x00)?;
                self.port_write(chip, port, REG_DEFAULT)?;
            }
        }

        Ok(())
    }

    /// Rewrites every configuration and output register from the shadows.
    ///
    /// Use after a failed write to bring the hardware back in line with the driver.
    pub fn sync(&mut self) -> Result<(), Digital64Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("digital64: sync {}", self.bank);

        for chip in Chip::ALL {
            for port in Port::ALL {
                let config = self.config_shadow(chip, port);
                self.write_register(chip, PCA9655_REG_CONFIG + port.offset(), config)?;
                let output = self.output_shadow(chip, port);
                self.write_register(chip, PCA9655_REG_OUTPUT + port.offset(), output)?;
            }
        }

        Ok(())
    }

    fn write_register(
        &mut self,
        chip: Chip,
        register: u8,
        value: u8,
    ) -> Result<(), Digital64Error<T::Error>> {
        let address = self.bank.device_address(chip);

        #[cfg(feature = "defmt")]
        defmt::trace!("digital64: {=u8:#x}[{=u8}] <- {=u8:#x}", address, register, value);

        self.transport
            .write_register(address, register, value)
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("digital64: write {=u8:#x}[{=u8}] failed", address, register);
                Digital64Error::WriteError(e)
            })
    }

    fn read_register(&mut self, chip: Chip, register: u8) -> Result<u8, Digital64Error<T::Error>> {
        let address = self.bank.device_address(chip);

        let value = self
            .transport
            .read_register(address, register)
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("digital64: read {=u8:#x}[{=u8}] failed", address, register);
                Digital64Error::ReadError(e)
            })?;

        #[cfg(feature = "defmt")]
        defmt::trace!("digital64: {=u8:#x}[{=u8}] -> {=u8:#x}", address, register, value);

        Ok(value)
    }

    /// Sets the direction of all 8 pins of a port.
    ///
    /// 1 = input, 0 = output, as in the hardware register. The shadow is updated
    /// before the write is issued.
    ///
    /// # Note
    ///
    /// Pins switched to output immediately drive the value held in the output register.
    pub fn set_config(
        &mut self,
        chip: Chip,
        port: Port,
        data: u8,
    ) -> Result<(), Digital64Error<T::Error>> {
        self.config[chip.index()][port.index()] = data;
        self.write_register(chip, PCA9655_REG_CONFIG + port.offset(), data)
    }

    /// Sets the direction of all 16 pins of a chip.
    ///
    /// Low byte goes to port 0, high byte to port 1.
    pub fn set_config_all(&mut self, chip: Chip, data: u16) -> Result<(), Digital64Error<T::Error>> {
        self.set_config(chip, Port::P0, (data & 0xFF) as u8)?;
        self.set_config(chip, Port::P1, (data >> 8) as u8)?;

        Ok(())
    }

    /// Sets the input polarity inversion of a port (1 = inverted).
    ///
    /// Polarity is never needed for single-pin operations, so it is not shadowed.
    pub fn set_polarity(
        &mut self,
        chip: Chip,
        port: Port,
        data: u8,
    ) -> Result<(), Digital64Error<T::Error>> {
        self.write_register(chip, PCA9655_REG_POLARITY + port.offset(), data)
    }

    /// Sets the input polarity inversion of all 16 pins of a chip.
    pub fn set_polarity_all(
        &mut self,
        chip: Chip,
        data: u16,
    ) -> Result<(), Digital64Error<T::Error>> {
        self.set_polarity(chip, Port::P0, (data & 0xFF) as u8)?;
        self.set_polarity(chip, Port::P1, (data >> 8) as u8)?;

        Ok(())
    }

    /// Writes the output register of a port.
    ///
    /// Each bit sets the corresponding pin's output (1 = high). Bit 0 is pin 0.
    pub fn port_write(
        &mut self,
        chip: Chip,
        port: Port,
        data: u8,
    ) -> Result<(), Digital64Error<T::Error>> {
        self.output[chip.index()][port.index()] = data;
        self.write_register(chip, PCA9655_REG_OUTPUT + port.offset(), data)
    }

    /// Writes the output registers of both ports of a chip.
    ///
    /// # Example
    ///
    /// ```ignore
    /// # use digital64::{Bank, Chip, Digital64};
    /// # let i2c = todo!();
    /// # let mut io = Digital64::new(i2c, Bank::Bank0);
    /// // Port 0 = 0x5A, port 1 = 0xA5
    /// io.port_write_all(Chip::A, 0xA55A).unwrap();
    /// ```
    pub fn port_write_all(&mut self, chip: Chip, data: u16) -> Result<(), Digital64Error<T::Error>> {
        self.port_write(chip, Port::P0, (data & 0xFF) as u8)?;
        self.port_write(chip, Port::P1, (data >> 8) as u8)?;

        Ok(())
    }

    /// Reads the input register of a port.
    ///
    /// The value is returned exactly as the chip reports it, after polarity inversion.
    pub fn port_read(&mut self, chip: Chip, port: Port) -> Result<u8, Digital64Error<T::Error>> {
        self.read_register(chip, PCA9655_REG_INPUT + port.offset())
    }

    /// Reads both input registers of a chip in one transfer.
    ///
    /// Returns port 0 in the low byte and port 1 in the high byte.
    pub fn port_read_all(&mut self, chip: Chip) -> Result<u16, Digital64Error<T::Error>> {
        let address = self.bank.device_address(chip);
        self.transport
            .read_register_pair(address, PCA9655_REG_INPUT)
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("digital64: read {=u8:#x} inputs failed", address);
                Digital64Error::ReadError(e)
            })
    }

    /// Configures the direction of a single pin.
    ///
    /// Modifies one bit of the configuration shadow and rewrites the whole register;
    /// the chip has no single-bit configuration access.
    ///
    /// # Arguments
    ///
    /// * `chip` - Chip on the shield
    /// * `port` - Port within the chip
    /// * `pin` - Bit within the port (0-7)
    /// * `mode` - [`PinMode::Input`] sets the config bit, [`PinMode::Output`] clears it
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the pin number is greater than 7.
    pub fn pin_mode(
        &mut self,
        chip: Chip,
        port: Port,
        pin: u8,
        mode: PinMode,
    ) -> Result<(), Digital64Error<T::Error>> {
        let mask = pin_mask(pin)?;
        let current = self.config_shadow(chip, port);

        let config = match mode {
            PinMode::Input => current | mask,
            PinMode::Output => current & !mask,
        };
        self.set_config(chip, port, config)
    }

    /// Configures the direction of a pin given as a flat index (0-15) within `chip`.
    pub fn pin_mode_flat(
        &mut self,
        chip: Chip,
        pin: u8,
        mode: PinMode,
    ) -> Result<(), Digital64Error<T::Error>> {
        let PortPin { port, pin } = PortPin::from_flat(pin)?;
        self.pin_mode(chip, port, pin, mode)
    }

    /// Configures the direction of a pin given as a global index (0-63).
    pub fn pin_mode_global(&mut self, index: u8, mode: PinMode) -> Result<(), Digital64Error<T::Error>> {
        let PinAddress { chip, port, pin } = PinAddress::from_global(index)?;
        self.pin_mode(chip, port, pin, mode)
    }

    /// Sets the output level of a single pin.
    ///
    /// Modifies one bit of the output shadow and rewrites the whole port; the other
    /// seven pins keep their last written level.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the pin number is greater than 7.
    ///
    /// # Example
    ///
    /// ```ignore
    /// # use digital64::{Bank, Chip, Digital64, PinMode, PinState, Port};
    /// # let i2c = todo!();
    /// # let mut io = Digital64::new(i2c, Bank::Bank0);
    /// io.pin_mode(Chip::A, Port::P0, 3, PinMode::Output).unwrap();
    /// io.digital_write(Chip::A, Port::P0, 3, PinState::High).unwrap();
    /// ```
    pub fn digital_write(
        &mut self,
        chip: Chip,
        port: Port,
        pin: u8,
        state: PinState,
    ) -> Result<(), Digital64Error<T::Error>> {
        let mask = pin_mask(pin)?;
        let current = self.output_shadow(chip, port);

        let output = match state {
            PinState::High => current | mask,
            PinState::Low => current & !mask,
        };
        self.port_write(chip, port, output)
    }

    /// Sets the output level of a pin given as a flat index (0-15) within `chip`.
    pub fn digital_write_flat(
        &mut self,
        chip: Chip,
        pin: u8,
        state: PinState,
    ) -> Result<(), Digital64Error<T::Error>> {
        let PortPin { port, pin } = PortPin::from_flat(pin)?;
        self.digital_write(chip, port, pin, state)
    }

    /// Sets the output level of a pin given as a global index (0-63).
    pub fn digital_write_global(
        &mut self,
        index: u8,
        state: PinState,
    ) -> Result<(), Digital64Error<T::Error>> {
        let PinAddress { chip, port, pin } = PinAddress::from_global(index)?;
        self.digital_write(chip, port, pin, state)
    }

    /// Reads the input state of a single pin.
    ///
    /// Returns `High` if the pin's bit is set in the input register.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the pin number is greater than 7, or `ReadError`
    /// if the bus transfer fails.
    pub fn digital_read(
        &mut self,
        chip: Chip,
        port: Port,
        pin: u8,
    ) -> Result<PinState, Digital64Error<T::Error>> {
        let mask = pin_mask(pin)?;
        let input = self.port_read(chip, port)?;
        Ok(PinState::from(input & mask != 0))
    }

    /// Reads a pin given as a flat index (0-15) within `chip`.
    pub fn digital_read_flat(&mut self, chip: Chip, pin: u8) -> Result<PinState, Digital64Error<T::Error>> {
        let PortPin { port, pin } = PortPin::from_flat(pin)?;
        self.digital_read(chip, port, pin)
    }

    /// Reads a pin given as a global index (0-63).
    pub fn digital_read_global(&mut self, index: u8) -> Result<PinState, Digital64Error<T::Error>> {
        let PinAddress { chip, port, pin } = PinAddress::from_global(index)?;
        self.digital_read(chip, port, pin)
    }
}

fn pin_mask<E>(pin: u8) -> Result<u8, Digital64Error<E>> {
    if pin > MAX_PORT_PIN {
        return Err(Digital64Error::InvalidArgument);
    }
    Ok(1 << pin)
}

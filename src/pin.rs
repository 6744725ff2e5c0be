//! Addressing for the 64 I/O lines: bank straps, chips, ports and pin indices.
//!
//! A line is identified by `(chip, port, pin)`. Two linear numberings are
//! supported on top of that:
//!
//! - flat pins, 0-15 within one chip (`port = flat >> 3`, `pin = flat & 7`)
//! - global pins, 0-63 across the bank (`chip = index >> 4`, low nibble is the flat pin)

/// Raw index rejected by one of the `TryFrom<u8>` conversions or pin decompositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidIndex(pub u8);

/// I2C addresses of chips A-D, per ADDR_SEL strap position.
static DEVICE_ADDRESSES: [[u8; Chip::COUNT]; 2] = [[0x20, 0x24, 0x22, 0x26], [0x21, 0x25, 0x23, 0x27]];

/// Board-level ADDR_SEL strap. Two shields on one bus must use different banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Strap in position 0 (chips at 0x20, 0x24, 0x22, 0x26)
    #[default]
    Bank0 = 0,
    /// Strap in position 1 (chips at 0x21, 0x25, 0x23, 0x27)
    Bank1 = 1,
}

impl Bank {
    /// 7-bit I2C address of `chip` on this bank.
    pub fn device_address(self, chip: Chip) -> u8 {
        DEVICE_ADDRESSES[self as usize][chip.index()]
    }
}

impl TryFrom<u8> for Bank {
    type Error = InvalidIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bank::Bank0),
            1 => Ok(Bank::Bank1),
            _ => Err(InvalidIndex(value)),
        }
    }
}

/// One of the four expanders on the shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chip {
    /// DIO_A
    A = 0,
    /// DIO_B
    B = 1,
    /// DIO_C
    C = 2,
    /// DIO_D
    D = 3,
}

impl Chip {
    /// Number of chips on one shield
    pub const COUNT: usize = 4;

    /// All chips in index order.
    pub const ALL: [Chip; Self::COUNT] = [Chip::A, Chip::B, Chip::C, Chip::D];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Chip {
    type Error = InvalidIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Chip::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidIndex(value))
    }
}

/// 8-pin half of a chip. Register offsets are `base + port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Pins 0-7 of a chip, low byte of 16-bit words
    P0 = 0,
    /// Pins 8-15 of a chip, high byte of 16-bit words
    P1 = 1,
}

impl Port {
    /// Number of ports per chip
    pub const COUNT: usize = 2;

    /// Both ports in register order.
    pub const ALL: [Port; Self::COUNT] = [Port::P0, Port::P1];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Register offset added to a register's base address.
    pub fn offset(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Port {
    type Error = InvalidIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Port::P0),
            1 => Ok(Port::P1),
            _ => Err(InvalidIndex(value)),
        }
    }
}

/// Highest pin number within a port.
pub const MAX_PORT_PIN: u8 = 7;
/// Highest flat pin number within a chip.
pub const MAX_FLAT_PIN: u8 = 15;
/// Highest global pin number within a bank.
pub const MAX_GLOBAL_PIN: u8 = 63;

/// A pin within one chip, split into its port and bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortPin {
    pub port: Port,
    /// Bit position within the port byte (0-7)
    pub pin: u8,
}

impl PortPin {
    /// Decomposes a flat pin (0-15) into port and bit.
    pub fn from_flat(flat: u8) -> Result<Self, InvalidIndex> {
        if flat > MAX_FLAT_PIN {
            return Err(InvalidIndex(flat));
        }
        let port = if flat >> 3 == 0 { Port::P0 } else { Port::P1 };
        Ok(Self {
            port,
            pin: flat & 0x07,
        })
    }

    /// Inverse of [`from_flat`](Self::from_flat).
    pub fn flat(self) -> u8 {
        self.port.offset() * 8 + self.pin
    }
}

/// A pin anywhere in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAddress {
    pub chip: Chip,
    pub port: Port,
    pub pin: u8,
}

impl PinAddress {
    /// Decomposes a global pin (0-63) into chip, port and bit.
    ///
    /// Pins 0-15 live on chip A, 16-31 on chip B, and so on.
    pub fn from_global(index: u8) -> Result<Self, InvalidIndex> {
        if index > MAX_GLOBAL_PIN {
            return Err(InvalidIndex(index));
        }
        let chip = Chip::ALL[usize::from(index >> 4)];
        let PortPin { port, pin } = PortPin::from_flat(index & 0x0F)?;
        Ok(Self { chip, port, pin })
    }

    pub fn global(self) -> u8 {
        (self.chip as u8) * 16 + self.port.offset() * 8 + self.pin
    }
}

//! Configuration registers and command codes of Series-7 and UltraScale+
//! FPGAs.
//!
//! The 5-bit register and command code spaces are enumerated completely,
//! including the reserved slots, so that decoded packets can always be
//! named. See [Xilinx UG470/UG570; "Configuration Registers"].

use serde::{Deserialize, Serialize};

/// Configuration registers addressed by TYPE1 packet headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum ConfigReg {
    /// CRC register.
    CRC = 0b00000,
    /// Frame address register.
    FAR = 0b00001,
    /// Frame data register input (config data write).
    FDRI = 0b00010,
    /// Frame data register output (config data read).
    FDRO = 0b00011,
    /// Command register.
    CMD = 0b00100,
    /// Control register 0.
    CTL0 = 0b00101,
    /// Masking register for CTL0 and CTL1.
    MASK = 0b00110,
    /// Status register.
    STAT = 0b00111,
    /// Legacy output register.
    LOUT = 0b01000,
    /// Configuration option register 0.
    COR0 = 0b01001,
    /// Multi frame write register.
    MFWR = 0b01010,
    /// Initial CBC value register.
    CBC = 0b01011,
    /// Device ID register.
    IDCODE = 0b01100,
    /// User access register.
    AXSS = 0b01101,
    /// Configuration option register 1.
    COR1 = 0b01110,
    /// Reserved register 15.
    RSVD15 = 0b01111,
    /// Warm boot start address register.
    WBSTAR = 0b10000,
    /// Watchdog timer register.
    TIMER = 0b10001,
    /// Reserved register 18.
    RSVD18 = 0b10010,
    /// Reserved register 19.
    RSVD19 = 0b10011,
    /// Reserved register 20.
    RSVD20 = 0b10100,
    /// Reserved register 21.
    RSVD21 = 0b10101,
    /// Boot history status register.
    BOOTSTS = 0b10110,
    /// Reserved register 23.
    RSVD23 = 0b10111,
    /// Control register 1.
    CTL1 = 0b11000,
    /// Reserved register 25.
    RSVD25 = 0b11001,
    /// Reserved register 26.
    RSVD26 = 0b11010,
    /// Reserved register 27.
    RSVD27 = 0b11011,
    /// Reserved register 28.
    RSVD28 = 0b11100,
    /// Reserved register 29.
    RSVD29 = 0b11101,
    /// Reserved register 30. Writes with a non-empty payload encapsulate
    /// the configuration stream of the next SLR (observed, undocumented).
    RSVD30 = 0b11110,
    /// BPI/SPI configuration options register.
    BSPI = 0b11111,
}

impl ConfigReg {
    /// Decodes a 5-bit register code (higher bits are ignored).
    pub fn from_code(code: u32) -> Self {
        use ConfigReg::*;
        match code & 0x1F {
            0b00000 => CRC,
            0b00001 => FAR,
            0b00010 => FDRI,
            0b00011 => FDRO,
            0b00100 => CMD,
            0b00101 => CTL0,
            0b00110 => MASK,
            0b00111 => STAT,
            0b01000 => LOUT,
            0b01001 => COR0,
            0b01010 => MFWR,
            0b01011 => CBC,
            0b01100 => IDCODE,
            0b01101 => AXSS,
            0b01110 => COR1,
            0b01111 => RSVD15,
            0b10000 => WBSTAR,
            0b10001 => TIMER,
            0b10010 => RSVD18,
            0b10011 => RSVD19,
            0b10100 => RSVD20,
            0b10101 => RSVD21,
            0b10110 => BOOTSTS,
            0b10111 => RSVD23,
            0b11000 => CTL1,
            0b11001 => RSVD25,
            0b11010 => RSVD26,
            0b11011 => RSVD27,
            0b11100 => RSVD28,
            0b11101 => RSVD29,
            0b11110 => RSVD30,
            _ => BSPI,
        }
    }

    /// The 5-bit register code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ConfigReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Command codes written to the CMD register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
pub enum ConfigCmd {
    /// Null command.
    NUL = 0b00000,
    /// Write configuration data (used prior to FDRI writes).
    WCFG = 0b00001,
    /// Multi frame write (used prior to MFWR writes in compressed streams).
    MFW = 0b00010,
    /// Last frame / deassert GHIGH_B signal.
    DGHIGH = 0b00011,
    /// Read configuration data (used prior to FDRO reads).
    RCFG = 0b00100,
    /// Begin start-up sequence (activates after next CRC check and DESYNC).
    START = 0b00101,
    /// Trigger clearing of the URAM.
    URAM = 0b00110,
    /// Reset CRC register.
    RCRC = 0b00111,
    /// Assert GHIGH_B signal (places interconnect in High-Z state).
    AGHIGH = 0b01000,
    /// Switch CCLK frequency.
    SWITCH = 0b01001,
    /// Pulse GRESTORE signal (set/reset CLB flip-flops).
    GRESTORE = 0b01010,
    /// Begin shutdown sequence (activates after next CRC or RCRC).
    SHUTDOWN = 0b01011,
    /// Reserved command 12.
    RSVD12 = 0b01100,
    /// Desynchronize the device (at end of configuration).
    DESYNC = 0b01101,
    /// Reserved command 14.
    RSVD14 = 0b01110,
    /// Trigger warm boot (internal PROG).
    IPROG = 0b01111,
    /// Trigger calculation of first readback CRC after reconfiguration.
    CRCC = 0b10000,
    /// Reload watchdog timer.
    LTIMER = 0b10001,
    /// BPI/SPI re-initialize bitstream read.
    BSPI_READ = 0b10010,
    /// Switch to negative-edge clocking (data capture on falling edge).
    FALL_EDGE = 0b10011,
    /// Reserved command 20.
    RSVD20 = 0b10100,
    /// Reserved command 21.
    RSVD21 = 0b10101,
    /// Reserved command 22.
    RSVD22 = 0b10110,
    /// Reserved command 23.
    RSVD23 = 0b10111,
    /// Reserved command 24.
    RSVD24 = 0b11000,
    /// Reserved command 25.
    RSVD25 = 0b11001,
    /// Reserved command 26.
    RSVD26 = 0b11010,
    /// Reserved command 27.
    RSVD27 = 0b11011,
    /// Reserved command 28.
    RSVD28 = 0b11100,
    /// Reserved command 29.
    RSVD29 = 0b11101,
    /// Reserved command 30.
    RSVD30 = 0b11110,
    /// Reserved command 31.
    RSVD31 = 0b11111,
}

impl ConfigCmd {
    /// Decodes a 5-bit command code (higher bits are ignored).
    pub fn from_code(code: u32) -> Self {
        use ConfigCmd::*;
        match code & 0x1F {
            0b00000 => NUL,
            0b00001 => WCFG,
            0b00010 => MFW,
            0b00011 => DGHIGH,
            0b00100 => RCFG,
            0b00101 => START,
            0b00110 => URAM,
            0b00111 => RCRC,
            0b01000 => AGHIGH,
            0b01001 => SWITCH,
            0b01010 => GRESTORE,
            0b01011 => SHUTDOWN,
            0b01100 => RSVD12,
            0b01101 => DESYNC,
            0b01110 => RSVD14,
            0b01111 => IPROG,
            0b10000 => CRCC,
            0b10001 => LTIMER,
            0b10010 => BSPI_READ,
            0b10011 => FALL_EDGE,
            0b10100 => RSVD20,
            0b10101 => RSVD21,
            0b10110 => RSVD22,
            0b10111 => RSVD23,
            0b11000 => RSVD24,
            0b11001 => RSVD25,
            0b11010 => RSVD26,
            0b11011 => RSVD27,
            0b11100 => RSVD28,
            0b11101 => RSVD29,
            0b11110 => RSVD30,
            _ => RSVD31,
        }
    }

    /// The 5-bit command code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ConfigCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_codes_round_trip() {
        for code in 0..32u32 {
            let reg = ConfigReg::from_code(code);
            assert_eq!(reg.code(), code);
        }
    }

    #[test]
    fn command_codes_round_trip() {
        for code in 0..32u32 {
            let cmd = ConfigCmd::from_code(code);
            assert_eq!(cmd.code(), code);
        }
    }

    #[test]
    fn canonical_register_codes() {
        assert_eq!(ConfigReg::FAR.code(), 1);
        assert_eq!(ConfigReg::FDRI.code(), 2);
        assert_eq!(ConfigReg::FDRO.code(), 3);
        assert_eq!(ConfigReg::CMD.code(), 4);
        assert_eq!(ConfigReg::MFWR.code(), 10);
        assert_eq!(ConfigReg::IDCODE.code(), 12);
        assert_eq!(ConfigReg::RSVD30.code(), 30);
    }

    #[test]
    fn canonical_command_codes() {
        assert_eq!(ConfigCmd::NUL.code(), 0);
        assert_eq!(ConfigCmd::WCFG.code(), 1);
        assert_eq!(ConfigCmd::MFW.code(), 2);
        assert_eq!(ConfigCmd::RCRC.code(), 7);
        assert_eq!(ConfigCmd::DESYNC.code(), 13);
        assert_eq!(ConfigCmd::IPROG.code(), 15);
        assert_eq!(ConfigCmd::FALL_EDGE.code(), 19);
    }

    #[test]
    fn high_bits_are_masked() {
        assert_eq!(ConfigReg::from_code(0x25), ConfigReg::CTL0);
        assert_eq!(ConfigCmd::from_code(0x27), ConfigCmd::RCRC);
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", ConfigReg::FDRI), "FDRI");
        assert_eq!(format!("{}", ConfigReg::RSVD30), "RSVD30");
        assert_eq!(format!("{}", ConfigCmd::GRESTORE), "GRESTORE");
    }
}

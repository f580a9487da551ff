use serde::Serialize;

use super::byte_order::ByteOrder;

/// Template wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Show addresses starting from 0 instead of 1.
    pub zero_addr: bool,
    /// Show addresses in decimal instead of hexadecimal.
    pub dec_addr: bool,

    def_byte_order: Option<ByteOrder>,
    def_byte_order_str: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zero_addr: false,
            dec_addr: true,
            def_byte_order: None,
            def_byte_order_str: String::new(),
        }
    }
}

impl Settings {
    pub fn set_to_default(&mut self) {
        *self = Self::default();
    }

    /// Byte order applied to elements and commands that do not specify one.
    pub fn def_byte_order(&self) -> Option<&ByteOrder> {
        self.def_byte_order.as_ref()
    }

    pub fn def_byte_order_str(&self) -> &str {
        &self.def_byte_order_str
    }

    /// Replaces the default byte order from its text form. Malformed text is
    /// kept as written but leaves no parsed order.
    pub fn set_def_byte_order_str(&mut self, text: impl Into<String>) {
        self.def_byte_order_str = text.into();
        self.def_byte_order = ByteOrder::parse(&self.def_byte_order_str);
    }

    pub fn set_def_byte_order(&mut self, byte_order: Option<ByteOrder>) {
        self.def_byte_order_str = ByteOrder::format(byte_order.as_ref());
        self.def_byte_order = byte_order;
    }

    /// Display form of the registers `[address, address + length)`.
    pub fn address_range(&self, address: u16, length: usize) -> String {
        let first = u32::from(address) + if self.zero_addr { 0 } else { 1 };
        let last = first + length.saturating_sub(1) as u32;
        if first == last {
            self.format_address(first)
        } else {
            format!("{}-{}", self.format_address(first), self.format_address(last))
        }
    }

    fn format_address(&self, address: u32) -> String {
        match self.dec_addr {
            true => address.to_string(),
            false => format!("{:04X}h", address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let settings = Settings::default();
        assert!(!settings.zero_addr);
        assert!(settings.dec_addr);
        assert_eq!(settings.def_byte_order(), None);
        assert_eq!(settings.def_byte_order_str(), "");
    }

    #[test]
    fn test_byte_order_forms_stay_in_sync() {
        let mut settings = Settings::default();
        settings.set_def_byte_order_str("1,0");
        assert_eq!(settings.def_byte_order().unwrap().as_slice(), &[1, 0]);

        settings.set_def_byte_order(Some(ByteOrder::from(vec![2, 3, 0, 1])));
        assert_eq!(settings.def_byte_order_str(), "2,3,0,1");

        settings.set_def_byte_order(None);
        assert_eq!(settings.def_byte_order_str(), "");

        settings.set_def_byte_order_str("x");
        assert_eq!(settings.def_byte_order(), None);
        assert_eq!(settings.def_byte_order_str(), "x");

        settings.zero_addr = true;
        settings.set_to_default();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_address_range() {
        let mut settings = Settings::default();
        assert_eq!(settings.address_range(0, 1), "1");
        assert_eq!(settings.address_range(9, 4), "10-13");

        settings.zero_addr = true;
        assert_eq!(settings.address_range(9, 4), "9-12");

        settings.dec_addr = false;
        assert_eq!(settings.address_range(255, 2), "00FFh-0100h");
        assert_eq!(settings.address_range(u16::MAX, 1), "FFFFh");
    }
}

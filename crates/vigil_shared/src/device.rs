//! Client platform classification.
//!
//! The login handshake reports a device OS integer; fly-detection thresholds
//! scale with it (touch platforms are both easier to mod and jitterier).

/// Coarse platform category reported in login metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// No metadata received (or unrecognized value).
    #[default]
    Unknown,
    /// Android.
    Android,
    /// iOS.
    Ios,
    /// macOS.
    MacOs,
    /// Amazon FireOS.
    FireOs,
    /// Gear VR.
    GearVr,
    /// HoloLens.
    HoloLens,
    /// Windows 10 (UWP client).
    Windows10,
    /// Win32 client.
    Win32,
    /// Dedicated / headless client.
    Dedicated,
}

impl DeviceClass {
    /// Maps the wire-format OS integer onto a class.
    ///
    /// Values outside the known range collapse to [`DeviceClass::Unknown`].
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Android,
            2 => Self::Ios,
            3 => Self::MacOs,
            4 => Self::FireOs,
            5 => Self::GearVr,
            6 => Self::HoloLens,
            7 => Self::Windows10,
            8 => Self::Win32,
            9 => Self::Dedicated,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_round_trip() {
        assert_eq!(DeviceClass::from_raw(1), DeviceClass::Android);
        assert_eq!(DeviceClass::from_raw(2), DeviceClass::Ios);
        assert_eq!(DeviceClass::from_raw(7), DeviceClass::Windows10);
        assert_eq!(DeviceClass::from_raw(9), DeviceClass::Dedicated);
    }

    #[test]
    fn test_unknown_values_collapse() {
        assert_eq!(DeviceClass::from_raw(0), DeviceClass::Unknown);
        assert_eq!(DeviceClass::from_raw(-1), DeviceClass::Unknown);
        assert_eq!(DeviceClass::from_raw(42), DeviceClass::Unknown);
    }
}

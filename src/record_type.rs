use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// The content types a TLS record header can start with.
///
/// Every TLS connection, of any protocol version, opens with a record
/// whose first byte is one of these. Anything else on a TLS-only port is
/// somebody speaking a different protocol, most often plaintext HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    /// `change_cipher_spec(20)`
    ChangeCipherSpec = 20,
    /// `alert(21)`
    Alert = 21,
    /// `handshake(22)`, the first record of a well-behaved client
    Handshake = 22,
    /// `application_data(23)`
    ApplicationData = 23,
}

impl TryFrom<u8> for RecordType {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            20 => Ok(Self::ChangeCipherSpec),
            21 => Ok(Self::Alert),
            22 => Ok(Self::Handshake),
            23 => Ok(Self::ApplicationData),
            other => Err(other),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(record_type: RecordType) -> Self {
        record_type as u8
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeCipherSpec => write!(f, "change_cipher_spec"),
            Self::Alert => write!(f, "alert"),
            Self::Handshake => write!(f, "handshake"),
            Self::ApplicationData => write!(f, "application_data"),
        }
    }
}

/// Reports whether `byte` is a valid TLS record content type.
pub fn is_tls_record_type(byte: u8) -> bool {
    RecordType::try_from(byte).is_ok()
}

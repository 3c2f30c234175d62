use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Result code reported by the billing service for any request.
///
/// Codes mirror the numeric values used on the wire, including the
/// negative range reserved for client-side connection problems. Codes
/// outside the known set are preserved in `Unknown` rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    ServiceTimeout,
    FeatureNotSupported,
    ServiceDisconnected,
    Ok,
    UserCanceled,
    ServiceUnavailable,
    BillingUnavailable,
    ItemUnavailable,
    DeveloperError,
    Error,
    ItemAlreadyOwned,
    ItemNotOwned,
    Unknown(i32),
}

impl ResponseCode {
    /// Numeric wire value for this code.
    pub fn code(&self) -> i32 {
        match self {
            ResponseCode::ServiceTimeout => -3,
            ResponseCode::FeatureNotSupported => -2,
            ResponseCode::ServiceDisconnected => -1,
            ResponseCode::Ok => 0,
            ResponseCode::UserCanceled => 1,
            ResponseCode::ServiceUnavailable => 2,
            ResponseCode::BillingUnavailable => 3,
            ResponseCode::ItemUnavailable => 4,
            ResponseCode::DeveloperError => 5,
            ResponseCode::Error => 6,
            ResponseCode::ItemAlreadyOwned => 7,
            ResponseCode::ItemNotOwned => 8,
            ResponseCode::Unknown(raw) => *raw,
        }
    }

    /// Decode a numeric wire value, mapping unrecognized values to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -3 => ResponseCode::ServiceTimeout,
            -2 => ResponseCode::FeatureNotSupported,
            -1 => ResponseCode::ServiceDisconnected,
            0 => ResponseCode::Ok,
            1 => ResponseCode::UserCanceled,
            2 => ResponseCode::ServiceUnavailable,
            3 => ResponseCode::BillingUnavailable,
            4 => ResponseCode::ItemUnavailable,
            5 => ResponseCode::DeveloperError,
            6 => ResponseCode::Error,
            7 => ResponseCode::ItemAlreadyOwned,
            8 => ResponseCode::ItemNotOwned,
            other => ResponseCode::Unknown(other),
        }
    }

    /// Human-readable description, suitable for logs and error dialogs.
    pub fn reason(&self) -> &'static str {
        match self {
            ResponseCode::ServiceTimeout => "Billing service request timed out",
            ResponseCode::FeatureNotSupported => "IAP feature not supported on the current device",
            ResponseCode::ServiceDisconnected => "Billing service disconnected",
            ResponseCode::Ok => "Success",
            ResponseCode::UserCanceled => "User cancelled IAP process",
            ResponseCode::ServiceUnavailable => "Network connection is down",
            ResponseCode::BillingUnavailable => {
                "Billing API version is not supported for the type requested"
            }
            ResponseCode::ItemUnavailable => "IAP item unavailable for purchase",
            ResponseCode::DeveloperError => {
                "Invalid arguments provided to the API, or this app is not properly setup for \
                 IAP, or does not have the necessary permissions in the manifest"
            }
            ResponseCode::Error => "Fatal error",
            ResponseCode::ItemAlreadyOwned => "IAP item already owned",
            ResponseCode::ItemNotOwned => "IAP item not owned",
            ResponseCode::Unknown(_) => "Unknown error",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.reason())
    }
}

impl Serialize for ResponseCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        Ok(ResponseCode::from_code(value))
    }
}

pub use std::default::Default;
pub use std::option::Option::{self, None, Some};
pub use std::result::Result::{Err, Ok};
pub use std::string::String;

/// Hex conversion utility
pub use bintext::hex;

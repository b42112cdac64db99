//! Data preprocessing module
//!
//! - Feature standardisation ([`StandardScaler`])
//! - Target label encoding ([`LabelEncoder`])

mod encoder;
mod scaler;

pub use encoder::{Label, LabelEncoder};
pub use scaler::StandardScaler;

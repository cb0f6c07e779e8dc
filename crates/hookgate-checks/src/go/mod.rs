//! Go checks: `gofmt`, `golangci-lint` and `go mod tidy`

mod fmt;
mod lint;
mod tidy;

pub use fmt::{FMT_INSTALL_HINT, fmt};
pub use lint::{LINT_INSTALL_HINT, lint};
pub use tidy::{TIDY_INSTALL_HINT, mod_tidy};

use crate::tool::ToolCheck;

/// Every Go check, in run order.
pub fn all() -> [ToolCheck; 3] {
    [fmt(), lint(), mod_tidy()]
}

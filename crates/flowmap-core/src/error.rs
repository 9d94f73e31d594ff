use std::fmt;

/// Machine-readable error codes surfaced by consumers of the core.
///
/// `normalize` and `truncate` never fail; these codes cover the edges around
/// them (reading input documents, loading configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    InputParseError,
    InventoryParseError,
    ConfigParseError,
    InvalidTruncationCap,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::InputParseError => "E1002",
            Self::InventoryParseError => "E1003",
            Self::ConfigParseError => "E2001",
            Self::InvalidTruncationCap => "E2002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Flow graph file not found",
            Self::InputParseError => "Flow graph file is not valid JSON",
            Self::InventoryParseError => "Inventory file parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidTruncationCap => "Invalid truncation cap",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => Some("Check the path passed to the command."),
            Self::InputParseError => {
                Some("Export the flow graph as JSON; any JSON value is accepted.")
            }
            Self::InventoryParseError => Some(
                "Inventory must be an object with optional folderNamesById, allDatasetNames, allRecipeNames, allFolderIds.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .flowmap/config.toml and retry."),
            Self::InvalidTruncationCap => Some("Use caps of at least 1, or --no-truncate."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Snake-case identifier used in JSON error payloads.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::InputNotFound => "input_not_found",
            Self::InputParseError => "input_parse_error",
            Self::InventoryParseError => "inventory_parse_error",
            Self::ConfigParseError => "config_parse_error",
            Self::InvalidTruncationCap => "invalid_truncation_cap",
            Self::InternalUnexpected => "internal_unexpected",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

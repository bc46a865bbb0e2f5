/// Common types and utilities for the solts code generator

/// Error type for generation operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Generic error with message
    #[error("{0}")]
    Generic(String),

    /// Malformed ABI document or entry
    #[error("Failed to parse ABI: {0}")]
    Parse(String),

    /// Tuple parameter declared without components
    #[error("Malformed interface: tuple parameter '{parameter}' has no components")]
    EmptyTuple {
        /// Offending parameter, qualified by its entry
        parameter: String,
    },

    /// More than one constructor in a single interface
    #[error("Malformed interface: contract '{contract}' declares more than one constructor")]
    DuplicateConstructor {
        /// Contract carrying the duplicate
        contract: String,
    },

    /// A name that cannot be used as an identifier in the generated module
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Two overloads give one parameter types that cannot be told apart at runtime
    #[error("Overload conflict in '{function}': parameter '{parameter}' is both {left} and {right}")]
    TypeConflict {
        /// Overloaded function name
        function: String,
        /// Parameter name shared by the overloads
        parameter: String,
        /// First conflicting type
        left: String,
        /// Second conflicting type
        right: String,
    },

    /// Two overloads accept exactly the same argument shapes
    #[error("Ambiguous overload in '{function}': {first} and {second} accept the same arguments")]
    AmbiguousOverload {
        /// Overloaded function name
        function: String,
        /// First canonical signature
        first: String,
        /// Second canonical signature
        second: String,
    },

    /// Overloads of one name declare different outputs
    #[error("Overload conflict in '{function}': {first} and {second} declare different outputs")]
    OutputConflict {
        /// Overloaded function name
        function: String,
        /// First canonical signature
        first: String,
        /// Second canonical signature
        second: String,
    },

    /// Diagnostics reported by the contract compiler
    #[error("Compilation failed:\n{0}")]
    Compilation(String),

    /// The contract compiler could not be run
    #[error("Compiler error: {0}")]
    Compiler(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a new generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a new compiler error
    pub fn compiler<S: Into<String>>(msg: S) -> Self {
        Error::Compiler(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Aggregate compiler diagnostics into a single fatal error
    pub fn compilation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages
            .into_iter()
            .map(|m| m.as_ref().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Error::Compilation(joined)
    }
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

use std::fmt;

/// Error codes for all validation diagnostics.
///
/// Format: E#### where the first digit indicates the area:
/// - E1xxx: Entity resolution
/// - E2xxx: Declarations and types
/// - E3xxx: Expressions and blocks
/// - E4xxx: Type-parameter inference
/// - W1xxx: Warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Resolution Errors (E1xxx)
    /// Reference to an entity that does not exist
    E1001,
    /// Reference matches entities in more than one module
    E1002,
    /// Reference to an id declared more than once in this module
    E1003,

    // Declaration and Type Errors (E2xxx)
    /// Two entities of one module share an id
    E2001,
    /// Duplicate member, method, option, argument, or type parameter name
    E2002,
    /// Reference type where only value types are allowed
    E2003,
    /// `&` marker does not match whether the type is a reference type
    E2004,
    /// Wrong number of type arguments for a named type
    E2005,
    /// Struct `requires` block is not Boolean
    E2006,
    /// Function body type differs from the declared return type
    E2007,
    /// Malformed union declaration
    E2008,
    /// Malformed `@Test` annotation
    E2009,

    // Expression and Block Errors (E3xxx)
    /// Unknown variable
    E3001,
    /// Variable assigned twice, or shadowing an entity or keyword
    E3002,
    /// Expression type differs from the expected type
    E3003,
    /// Possibly aliased reference captured into a variable
    E3004,
    /// More than one referential action in one statement
    E3005,
    /// Block is empty or ends with an assignment
    E3006,
    /// Wrong number of arguments
    E3007,
    /// Called or bound expression is not a function
    E3008,
    /// Follow on a value that has no members
    E3009,
    /// Unknown member or method
    E3010,
    /// If/then arms have different types
    E3011,
    /// Literal rejected by its type's literal validator
    E3012,
    /// Type has no literal form
    E3013,
    /// Literal type chain loops back on itself
    E3014,
    /// Bound argument's type depends on an unbound type parameter
    E3015,

    // Inference Errors (E4xxx)
    /// More explicit type arguments than the function takes
    E4001,
    /// Type argument could be neither inferred nor taken from explicit ones
    E4002,
    /// Type argument violates its typeclass constraint
    E4003,
    /// Reference type chosen as a type argument
    E4004,

    // Warnings (W1xxx)
    /// Unrecognized annotation
    W1001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Resolution
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            // Declarations and types
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            // Expressions
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E3012 => "E3012",
            ErrorCode::E3013 => "E3013",
            ErrorCode::E3014 => "E3014",
            ErrorCode::E3015 => "E3015",
            // Inference
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            // Warnings
            ErrorCode::W1001 => "W1001",
        }
    }

    /// Check if this is a warning code (Wxxx range).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    pub fn is_resolution_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

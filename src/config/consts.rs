/// Output port used when a connection does not name one
pub const DEFAULT_FROM_PORT: &str = "o1";
/// Input port used when a connection does not name one
pub const DEFAULT_TO_PORT: &str = "i1";
/// Engine API version written into every program document
pub const DEFAULT_API_VERSION: &str = "v1";
/// Column of a data source carrying the message time
pub const TIME_COLUMN: &str = "time";
/// Separator between an instance id and the ids of the operators it expands to
pub const SCOPE_SEPARATOR: &str = "::";
/// Opening of a parameter reference inside a prototype document (`${name}`)
pub const PARAMETER_MARKER_OPEN: &str = "${";
/// Closing of a parameter reference inside a prototype document
pub const PARAMETER_MARKER_CLOSE: &str = "}";
/// Length of generated program ids
pub const DEFAULT_PROGRAM_ID_LENGTH: usize = 8;
/// Operator type that becomes the entry operator when none was set explicitly
pub const INPUT_OPERATOR_TYPE: &str = "Input";
/// Separator between operator id and port id in result column names (`ma1:o1`)
pub const PORT_SEPARATOR: &str = ":";
/// Keys of a primitive operator on the wire that a parameter must not shadow
pub const RESERVED_OPERATOR_KEYS: [&str; 3] = ["id", "type", "prototype"];

//! Shared constants for msgpipe.
//!
//! Column names and defaults that the loader, decoder and CLI agree on.

/// Join key present in both input files.
pub const ID_COLUMN: &str = "id";

/// Column holding the packed `name-value;name-value` string.
pub const CATEGORIES_COLUMN: &str = "categories";

/// Separator between tokens in a packed category string.
pub const TOKEN_SEPARATOR: char = ';';

/// Separator between the name and value inside one token.
pub const NAME_VALUE_SEPARATOR: char = '-';

/// Indicator value marking an ambiguous label; rows carrying it in the first
/// indicator column are removed.
pub const INVALID_INDICATOR: i64 = 2;

/// Largest indicator value accepted in strict mode.
pub const MAX_INDICATOR: i64 = 2;

/// Table written when neither `--table` nor `MSGPIPE_TABLE` is given.
pub const DEFAULT_TABLE_NAME: &str = "Dataset";

/// Environment variable overriding the destination table name.
pub const TABLE_ENV: &str = "MSGPIPE_TABLE";

/// Environment variable selecting `strict` or `lenient` decoding.
pub const DECODE_MODE_ENV: &str = "MSGPIPE_DECODE_MODE";

/// Suffixes applied to non-key columns present in both inputs.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

pub const COMMENT_PREFIX: char = '#';
pub const TIMESTAMP_SEPARATOR: char = '|';

/// Binary and command name.
pub const APP_NAME: &str = "bisectrun";

/// Config file looked up in the project directory when none is given.
pub const CONFIG_FILE_NAME: &str = "bisectrun.lua";

/// Prefix of every status line, so outcomes are easy to spot in bisect logs.
pub const STATUS_PREFIX: &str = "TEST:";
